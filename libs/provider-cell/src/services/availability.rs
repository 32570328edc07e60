use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate, Utc};
use serde_json::json;
use tracing::{debug, warn};

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{AvailabilityResponse, AvailabilitySlot, ProviderError};

/// Default lookahead when the caller gives no window.
const DEFAULT_WINDOW_DAYS: i64 = 30;

pub struct AvailabilityService {
    supabase: SupabaseClient,
}

impl AvailabilityService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// Fetch a provider's open slots in the window, grouped per date as
    /// sorted HH:MM start times. A store failure degrades to the canned
    /// schedule instead of failing the request; the response is flagged so
    /// the client can show a banner.
    pub async fn get_availability(
        &self,
        provider_id: &str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> AvailabilityResponse {
        let today = Utc::now().date_naive();
        let from = from.unwrap_or(today);
        let to = to.unwrap_or(from + Duration::days(DEFAULT_WINDOW_DAYS));

        debug!("Fetching availability for provider {} ({} to {})", provider_id, from, to);

        let filters = format!(
            "provider_id=eq.{}&is_available=eq.true&date=gte.{}&date=lte.{}&order=date,start_time",
            urlencoding::encode(provider_id),
            from,
            to
        );

        match self
            .supabase
            .select::<AvailabilitySlot>("provider_availability", &filters, None)
            .await
        {
            Ok(slots) => group_slots(provider_id, slots),
            Err(e) => {
                warn!("Availability fetch failed for provider {}: {}; serving fallback schedule", provider_id, e);
                fallback_schedule(provider_id, today)
            }
        }
    }

    /// Mark the booked slot unavailable. Best effort: the booking already
    /// exists by the time this runs, so a failure is reported to the caller
    /// only through the Result, not by unwinding the booking.
    pub async fn mark_slot_unavailable(
        &self,
        provider_id: &str,
        date: NaiveDate,
        start_time: &str,
        auth_token: &str,
    ) -> Result<(), ProviderError> {
        let filters = format!(
            "provider_id=eq.{}&date=eq.{}&start_time=eq.{}",
            urlencoding::encode(provider_id),
            date,
            urlencoding::encode(start_time)
        );

        let _: Vec<AvailabilitySlot> = self
            .supabase
            .update(
                "provider_availability",
                &filters,
                json!({ "is_available": false }),
                Some(auth_token),
            )
            .await
            .map_err(|e| ProviderError::ExternalServiceError(e.to_string()))?;

        Ok(())
    }
}

fn group_slots(provider_id: &str, slots: Vec<AvailabilitySlot>) -> AvailabilityResponse {
    let mut slots_by_date: BTreeMap<NaiveDate, Vec<String>> = BTreeMap::new();

    for slot in slots {
        // Stored times are HH:MM:SS; pickers want HH:MM.
        let start = slot.start_time.chars().take(5).collect::<String>();
        slots_by_date.entry(slot.date).or_default().push(start);
    }

    for times in slots_by_date.values_mut() {
        times.sort();
        times.dedup();
    }

    AvailabilityResponse {
        provider_id: provider_id.to_string(),
        available_dates: slots_by_date.keys().copied().collect(),
        slots_by_date,
        fallback: false,
    }
}

/// The fixed schedule served when the store is unreachable: seven dates at
/// offsets 0, 1, 2, 3, 5, 7, 8 days from today with preset time lists.
pub fn fallback_schedule(provider_id: &str, today: NaiveDate) -> AvailabilityResponse {
    const OFFSETS: [i64; 7] = [0, 1, 2, 3, 5, 7, 8];
    const TIMES: [&[&str]; 7] = [
        &["09:00", "10:00", "11:00", "14:00", "15:00"],
        &["09:00", "10:00", "13:00", "14:00", "16:00"],
        &["10:00", "11:00", "13:00", "15:00"],
        &["09:00", "11:00", "14:00"],
        &["10:00", "13:00", "16:00"],
        &["09:00", "10:00", "11:00", "14:00"],
        &["13:00", "14:00", "15:00", "16:00"],
    ];

    let mut slots_by_date = BTreeMap::new();
    for (offset, times) in OFFSETS.iter().zip(TIMES.iter()) {
        let date = today + Duration::days(*offset);
        slots_by_date.insert(date, times.iter().map(|t| t.to_string()).collect());
    }

    AvailabilityResponse {
        provider_id: provider_id.to_string(),
        available_dates: slots_by_date.keys().copied().collect(),
        slots_by_date,
        fallback: true,
    }
}
