use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Catalog entry from the `services` collection. Read-only reference data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub estimated_duration: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentMethodInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

/// The completed booking draft: one field per wizard step. The wizard's
/// step gating lives in `validate_booking_request`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBookingRequest {
    // Step 0: service selection
    pub service_id: String,
    pub duration: i32,
    pub special_requirements: Option<String>,

    // Step 1: time slot
    pub provider_id: String,
    pub appointment_date: NaiveDate,
    pub start_time: String,

    // Step 2: payment
    pub payment_method: String,
}

/// What the confirmation screen shows: the accumulated draft echoed back
/// with display formatting plus the store-assigned id.
#[derive(Debug, Serialize, Deserialize)]
pub struct BookingConfirmation {
    pub appointment_id: String,
    pub service_id: String,
    pub service_name: String,
    pub appointment_date: NaiveDate,
    pub formatted_date: String,
    pub start_time: String,
    pub duration: i32,
    pub duration_display: String,
    pub payment_method: String,
    pub payment_method_display: String,
    pub amount: f64,
    pub status: String,
}

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Service not found")]
    ServiceNotFound,

    #[error("Payment failed: {0}")]
    PaymentFailed(String),

    #[error("External service error: {0}")]
    ExternalServiceError(String),
}
