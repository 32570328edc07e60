use chrono::{Duration, NaiveTime, Utc};
use serde_json::json;
use tracing::{debug, warn};

use appointment_cell::models::{Appointment, AppointmentStatus};
use provider_cell::services::AvailabilityService;
use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{BookingConfirmation, BookingError, CreateBookingRequest};
use crate::services::catalog::{fallback_service_name, CatalogService};
use crate::services::payment;

const MIN_DURATION_MINUTES: i32 = 30;
const MAX_DURATION_MINUTES: i32 = 180;
const DURATION_INCREMENT_MINUTES: i32 = 15;

pub struct BookingService<'a> {
    config: &'a AppConfig,
    supabase: SupabaseClient,
}

impl<'a> BookingService<'a> {
    pub fn new(config: &'a AppConfig) -> Self {
        Self {
            config,
            supabase: SupabaseClient::new(config),
        }
    }

    /// Complete a booking draft: validate the three input steps, capture the
    /// (simulated) payment, insert the appointment, flip the booked slot,
    /// and echo the draft back as the confirmation.
    pub async fn book(
        &self,
        patient_id: &str,
        request: &CreateBookingRequest,
        auth_token: &str,
    ) -> Result<BookingConfirmation, BookingError> {
        let start = validate_booking_request(request)?;
        let end_time = end_time_display(start, request.duration)?;
        let amount = payment::calculate_amount(request.duration);

        payment::process_payment(&request.payment_method, amount).await?;

        debug!(
            "Creating appointment for patient {} with provider {} on {} at {}",
            patient_id, request.provider_id, request.appointment_date, request.start_time
        );

        let row = json!({
            "patient_id": patient_id,
            "provider_id": request.provider_id,
            "service_id": request.service_id,
            "appointment_date": request.appointment_date,
            "start_time": request.start_time,
            "end_time": end_time,
            "duration": request.duration,
            "special_requirements": request.special_requirements,
            "status": AppointmentStatus::Upcoming,
            "payment_method": request.payment_method,
            "payment_status": "completed",
            "amount": amount,
            "created_at": Utc::now().to_rfc3339(),
            "updated_at": Utc::now().to_rfc3339(),
        });

        let appointment: Appointment = self
            .supabase
            .insert("appointments", row, Some(auth_token))
            .await
            .map_err(|e| BookingError::ExternalServiceError(e.to_string()))?;

        // Best effort: the booking exists either way, so a failed flip is
        // logged rather than surfaced (the slot stays visible until then).
        let availability = AvailabilityService::new(self.config);
        if let Err(e) = availability
            .mark_slot_unavailable(
                &request.provider_id,
                request.appointment_date,
                &request.start_time,
                auth_token,
            )
            .await
        {
            warn!(
                "Could not mark slot {} {} unavailable for provider {}: {}",
                request.appointment_date, request.start_time, request.provider_id, e
            );
        }

        let service_name = match CatalogService::new(self.config)
            .get_service(&request.service_id)
            .await
        {
            Ok(service) => service.name,
            Err(_) => fallback_service_name(&request.service_id).to_string(),
        };

        Ok(build_confirmation(&appointment.id, request, &service_name, amount))
    }
}

/// The wizard's step gating, enforced centrally instead of per screen.
pub fn validate_booking_request(request: &CreateBookingRequest) -> Result<NaiveTime, BookingError> {
    // Step 0: service selection
    if request.service_id.trim().is_empty() {
        return Err(BookingError::ValidationError("A service must be selected".to_string()));
    }
    if request.duration < MIN_DURATION_MINUTES || request.duration > MAX_DURATION_MINUTES {
        return Err(BookingError::ValidationError(format!(
            "Duration must be between {} and {} minutes",
            MIN_DURATION_MINUTES, MAX_DURATION_MINUTES
        )));
    }
    if request.duration % DURATION_INCREMENT_MINUTES != 0 {
        return Err(BookingError::ValidationError(format!(
            "Duration must be in {}-minute increments",
            DURATION_INCREMENT_MINUTES
        )));
    }

    // Step 1: time slot
    if request.provider_id.trim().is_empty() {
        return Err(BookingError::ValidationError("A provider must be selected".to_string()));
    }
    let start = NaiveTime::parse_from_str(&request.start_time, "%H:%M")
        .map_err(|_| BookingError::ValidationError("Start time must be HH:MM".to_string()))?;

    // Step 2: payment
    if !payment::is_supported_method(&request.payment_method) {
        return Err(BookingError::ValidationError(format!(
            "Unknown payment method: {}",
            request.payment_method
        )));
    }

    Ok(start)
}

/// End time for a draft. Appointments are same-day; adding the duration to
/// `NaiveTime` would silently wrap past midnight, so a wrapping draft is
/// rejected instead.
fn end_time_display(start: NaiveTime, duration_minutes: i32) -> Result<String, BookingError> {
    let (end, wrapped) =
        start.overflowing_add_signed(Duration::minutes(i64::from(duration_minutes)));
    if wrapped != 0 {
        return Err(BookingError::ValidationError(
            "Appointment cannot run past midnight".to_string(),
        ));
    }
    Ok(end.format("%H:%M").to_string())
}

fn build_confirmation(
    appointment_id: &str,
    request: &CreateBookingRequest,
    service_name: &str,
    amount: f64,
) -> BookingConfirmation {
    BookingConfirmation {
        appointment_id: appointment_id.to_string(),
        service_id: request.service_id.clone(),
        service_name: service_name.to_string(),
        appointment_date: request.appointment_date,
        formatted_date: request.appointment_date.format("%m/%d/%Y").to_string(),
        start_time: request.start_time.clone(),
        duration: request.duration,
        duration_display: format!("{} minutes", request.duration),
        payment_method: request.payment_method.clone(),
        payment_method_display: payment::method_display_name(&request.payment_method),
        amount,
        status: AppointmentStatus::Upcoming.to_string(),
    }
}
