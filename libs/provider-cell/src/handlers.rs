use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::auth::{User, UserRole};
use shared_models::error::AppError;
use shared_utils::extractor::require_role;

use crate::models::{AvailabilityQuery, AvailabilityResponse, ProviderError, ProviderSearchQuery, ProviderSearchResponse};
use crate::services::{AvailabilityService, ProviderService};

fn map_provider_error(e: ProviderError) -> AppError {
    match e {
        ProviderError::NotFound => AppError::NotFound("Provider not found".to_string()),
        ProviderError::ValidationError(msg) => AppError::ValidationError(msg),
        ProviderError::ExternalServiceError(msg) => AppError::ExternalService(msg),
    }
}

#[axum::debug_handler]
pub async fn search_providers(
    State(config): State<Arc<AppConfig>>,
    Query(query): Query<ProviderSearchQuery>,
) -> Result<Json<ProviderSearchResponse>, AppError> {
    let service = ProviderService::new(&config);

    let providers = service
        .search_providers(&query)
        .await
        .map_err(map_provider_error)?;

    let total = providers.len();
    Ok(Json(ProviderSearchResponse { providers, total }))
}

#[axum::debug_handler]
pub async fn get_provider(
    State(config): State<Arc<AppConfig>>,
    Path(provider_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let service = ProviderService::new(&config);

    let provider = service
        .get_provider(&provider_id)
        .await
        .map_err(map_provider_error)?;

    Ok(Json(json!(provider)))
}

/// Admin-only: mark a provider as verified.
#[axum::debug_handler]
pub async fn verify_provider(
    State(config): State<Arc<AppConfig>>,
    Path(provider_id): Path<String>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    require_role(&user, UserRole::Admin)?;

    let service = ProviderService::new(&config);

    let provider = service
        .set_verified(&provider_id, true, auth.token())
        .await
        .map_err(map_provider_error)?;

    Ok(Json(json!({
        "success": true,
        "provider": provider
    })))
}

#[axum::debug_handler]
pub async fn get_availability(
    State(config): State<Arc<AppConfig>>,
    Path(provider_id): Path<String>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    let service = AvailabilityService::new(&config);

    let availability = service
        .get_availability(&provider_id, query.from, query.to)
        .await;

    Ok(Json(availability))
}
