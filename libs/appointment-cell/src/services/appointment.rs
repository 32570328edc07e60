use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{Appointment, AppointmentError, AppointmentStatus, RescheduleRequest};

pub struct AppointmentService {
    supabase: SupabaseClient,
}

impl AppointmentService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn get_appointment(
        &self,
        appointment_id: &str,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        debug!("Fetching appointment {}", appointment_id);

        let rows: Vec<Appointment> = self
            .supabase
            .select(
                "appointments",
                &format!("id=eq.{}", urlencoding::encode(appointment_id)),
                Some(auth_token),
            )
            .await
            .map_err(|e| AppointmentError::ExternalServiceError(e.to_string()))?;

        rows.into_iter().next().ok_or(AppointmentError::NotFound)
    }

    pub async fn list_for_patient(
        &self,
        patient_id: &str,
        auth_token: &str,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        debug!("Listing appointments for patient {}", patient_id);

        let path = format!(
            "/rest/v1/appointments?select=*,provider:provider_id(name),service:service_id(name)&patient_id=eq.{}&order=appointment_date.desc",
            urlencoding::encode(patient_id)
        );

        let rows: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| AppointmentError::ExternalServiceError(e.to_string()))?;

        rows.into_iter().map(flatten_joined_row).collect()
    }

    pub async fn list_for_provider(
        &self,
        provider_id: &str,
        auth_token: &str,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        debug!("Listing appointments for provider {}", provider_id);

        let path = format!(
            "/rest/v1/appointments?select=*,patient:patient_id(name),service:service_id(name)&provider_id=eq.{}&order=appointment_date.desc",
            urlencoding::encode(provider_id)
        );

        let rows: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| AppointmentError::ExternalServiceError(e.to_string()))?;

        rows.into_iter().map(flatten_joined_row).collect()
    }

    /// Apply a status transition. Legality is checked against the central
    /// table before any write; re-asserting the current status is a no-op
    /// that returns the stored row unchanged. The write asks the store for
    /// its representation, so the response is never a local guess.
    pub async fn update_status(
        &self,
        appointment_id: &str,
        next: AppointmentStatus,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        let current = self.get_appointment(appointment_id, auth_token).await?;

        if current.status == next {
            debug!("Appointment {} already {}, no-op", appointment_id, next);
            return Ok(current);
        }

        if !current.status.can_transition_to(next) {
            return Err(AppointmentError::IllegalTransition {
                from: current.status,
                to: next,
            });
        }

        debug!("Transitioning appointment {} {} -> {}", appointment_id, current.status, next);

        let changes = json!({
            "status": next,
            "updated_at": Utc::now().to_rfc3339(),
        });

        let updated: Vec<Appointment> = self
            .supabase
            .update(
                "appointments",
                &format!("id=eq.{}", urlencoding::encode(appointment_id)),
                changes,
                Some(auth_token),
            )
            .await
            .map_err(|e| AppointmentError::ExternalServiceError(e.to_string()))?;

        updated.into_iter().next().ok_or(AppointmentError::NotFound)
    }

    /// Move an appointment to a new slot through the store's
    /// `reschedule_appointment` procedure, which releases the old slot and
    /// claims the new one in a single call.
    pub async fn reschedule(
        &self,
        appointment_id: &str,
        request: &RescheduleRequest,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        let current = self.get_appointment(appointment_id, auth_token).await?;

        if current.status != AppointmentStatus::Upcoming {
            return Err(AppointmentError::ValidationError(
                "Only upcoming appointments can be rescheduled".to_string(),
            ));
        }

        let args = json!({
            "p_appointment_id": appointment_id,
            "p_new_date": request.new_date,
            "p_new_start_time": request.new_start_time,
            "p_new_end_time": request.new_end_time,
            "p_provider_id": current.provider_id,
            "p_old_date": current.appointment_date,
            "p_old_start_time": current.start_time,
        });

        let _: Value = self
            .supabase
            .rpc("reschedule_appointment", args, Some(auth_token))
            .await
            .map_err(|e| AppointmentError::ExternalServiceError(e.to_string()))?;

        // Fetch after mutate so the caller sees the store's view of the row.
        self.get_appointment(appointment_id, auth_token).await
    }
}

/// Flatten a PostgREST embedded-join row into the flat Appointment shape.
fn flatten_joined_row(mut row: Value) -> Result<Appointment, AppointmentError> {
    let obj = row
        .as_object_mut()
        .ok_or_else(|| AppointmentError::ExternalServiceError("Row is not an object".to_string()))?;

    for (joined, field) in [
        ("provider", "provider_name"),
        ("service", "service_name"),
        ("patient", "patient_name"),
    ] {
        if let Some(name) = obj
            .remove(joined)
            .and_then(|v| v.get("name").cloned())
            .filter(|v| !v.is_null())
        {
            obj.insert(field.to_string(), name);
        }
    }

    serde_json::from_value(row)
        .map_err(|e| AppointmentError::ExternalServiceError(format!("Malformed appointment row: {}", e)))
}
