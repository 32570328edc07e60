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

use crate::models::DashboardError;
use crate::services::DashboardService;

fn map_dashboard_error(e: DashboardError) -> AppError {
    match e {
        DashboardError::ExternalServiceError(msg) => AppError::ExternalService(msg),
    }
}

#[axum::debug_handler]
pub async fn patient_dashboard(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    require_role(&user, UserRole::Patient)?;

    let service = DashboardService::new(&config);

    let dashboard = service
        .patient_dashboard(&user.id, auth.token())
        .await
        .map_err(map_dashboard_error)?;

    Ok(Json(json!(dashboard)))
}

#[axum::debug_handler]
pub async fn provider_dashboard(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    require_role(&user, UserRole::Provider)?;

    let service = DashboardService::new(&config);

    let dashboard = service
        .provider_dashboard(&user.id, auth.token())
        .await
        .map_err(map_dashboard_error)?;

    Ok(Json(json!(dashboard)))
}

#[axum::debug_handler]
pub async fn admin_dashboard(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    require_role(&user, UserRole::Admin)?;

    let service = DashboardService::new(&config);

    let dashboard = service
        .admin_dashboard(auth.token())
        .await
        .map_err(map_dashboard_error)?;

    Ok(Json(json!(dashboard)))
}
