use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::auth::{User, UserRole};
use shared_models::error::AppError;

use crate::models::{
    Appointment, AppointmentError, AppointmentStatus, RescheduleRequest, UpdateStatusRequest,
};
use crate::services::AppointmentService;

fn map_appointment_error(e: AppointmentError) -> AppError {
    match e {
        AppointmentError::NotFound => AppError::NotFound("Appointment not found".to_string()),
        AppointmentError::IllegalTransition { from, to } => {
            AppError::Conflict(format!("Cannot move appointment from {} to {}", from, to))
        }
        AppointmentError::Unauthorized => {
            AppError::Auth("Not authorized for this appointment".to_string())
        }
        AppointmentError::ValidationError(msg) => AppError::BadRequest(msg),
        AppointmentError::ExternalServiceError(msg) => AppError::ExternalService(msg),
    }
}

/// Which transitions each participant may request. Patients cancel their own
/// upcoming appointments; providers start and complete their own; admins may
/// request anything the transition table allows.
fn authorize_transition(
    user: &User,
    appointment: &Appointment,
    next: AppointmentStatus,
) -> Result<(), AppError> {
    if user.is_admin() {
        return Ok(());
    }

    let is_patient = appointment.patient_id == user.id;
    let is_provider = appointment.provider_id == user.id;

    let allowed = match next {
        AppointmentStatus::Cancelled => is_patient,
        AppointmentStatus::InProgress | AppointmentStatus::Completed => is_provider,
        AppointmentStatus::Upcoming => false,
    };

    if allowed {
        Ok(())
    } else {
        Err(AppError::Auth(format!(
            "Not authorized to set this appointment to {}",
            next
        )))
    }
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(config): State<Arc<AppConfig>>,
    Path(appointment_id): Path<String>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentService::new(&config);

    let appointment = service
        .get_appointment(&appointment_id, auth.token())
        .await
        .map_err(map_appointment_error)?;

    if !appointment.involves(&user.id) && !user.is_admin() {
        return Err(AppError::Auth("Not authorized to view this appointment".to_string()));
    }

    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn get_patient_appointments(
    State(config): State<Arc<AppConfig>>,
    Path(patient_id): Path<String>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    if user.id != patient_id && !user.is_admin() {
        return Err(AppError::Auth("Not authorized to view these appointments".to_string()));
    }

    let service = AppointmentService::new(&config);

    let appointments = service
        .list_for_patient(&patient_id, auth.token())
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({
        "appointments": appointments,
        "total": appointments.len()
    })))
}

#[axum::debug_handler]
pub async fn get_provider_appointments(
    State(config): State<Arc<AppConfig>>,
    Path(provider_id): Path<String>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let is_own = user.id == provider_id && user.has_role(UserRole::Provider);
    if !is_own && !user.is_admin() {
        return Err(AppError::Auth("Not authorized to view these appointments".to_string()));
    }

    let service = AppointmentService::new(&config);

    let appointments = service
        .list_for_provider(&provider_id, auth.token())
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({
        "appointments": appointments,
        "total": appointments.len()
    })))
}

#[axum::debug_handler]
pub async fn update_status(
    State(config): State<Arc<AppConfig>>,
    Path(appointment_id): Path<String>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentService::new(&config);

    let current = service
        .get_appointment(&appointment_id, auth.token())
        .await
        .map_err(map_appointment_error)?;

    authorize_transition(&user, &current, request.status)?;

    let updated = service
        .update_status(&appointment_id, request.status, auth.token())
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": updated
    })))
}

#[axum::debug_handler]
pub async fn reschedule_appointment(
    State(config): State<Arc<AppConfig>>,
    Path(appointment_id): Path<String>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<RescheduleRequest>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentService::new(&config);

    let current = service
        .get_appointment(&appointment_id, auth.token())
        .await
        .map_err(map_appointment_error)?;

    if current.patient_id != user.id && !user.is_admin() {
        return Err(AppError::Auth("Not authorized to reschedule this appointment".to_string()));
    }

    let updated = service
        .reschedule(&appointment_id, &request, auth.token())
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": updated
    })))
}
