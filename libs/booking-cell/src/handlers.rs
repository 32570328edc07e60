use std::sync::Arc;

use axum::{
    extract::{Extension, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::auth::{User, UserRole};
use shared_models::error::AppError;
use shared_utils::extractor::require_role;

use crate::models::{BookingError, CreateBookingRequest};
use crate::services::{payment, BookingService, CatalogService};

fn map_booking_error(e: BookingError) -> AppError {
    match e {
        BookingError::ValidationError(msg) => AppError::ValidationError(msg),
        BookingError::ServiceNotFound => AppError::NotFound("Service not found".to_string()),
        BookingError::PaymentFailed(msg) => AppError::BadRequest(msg),
        BookingError::ExternalServiceError(msg) => AppError::ExternalService(msg),
    }
}

#[axum::debug_handler]
pub async fn get_services(
    State(config): State<Arc<AppConfig>>,
) -> Result<Json<Value>, AppError> {
    let catalog = CatalogService::new(&config);

    let services = catalog.list_services().await.map_err(map_booking_error)?;

    Ok(Json(json!({
        "services": services,
        "total": services.len()
    })))
}

#[axum::debug_handler]
pub async fn get_payment_methods() -> Json<Value> {
    Json(json!({ "payment_methods": payment::PAYMENT_METHODS }))
}

/// Complete a booking draft. The authenticated user is always the patient
/// on the created appointment.
#[axum::debug_handler]
pub async fn create_booking(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateBookingRequest>,
) -> Result<Json<Value>, AppError> {
    require_role(&user, UserRole::Patient)?;

    let service = BookingService::new(&config);

    let confirmation = service
        .book(&user.id, &request, auth.token())
        .await
        .map_err(map_booking_error)?;

    Ok(Json(json!({
        "success": true,
        "confirmation": confirmation
    })))
}
