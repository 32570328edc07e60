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
use shared_utils::extractor::require_role;

use crate::models::{CreateReviewRequest, ProviderReviewsResponse, ReviewError};
use crate::services::ReviewService;

fn map_review_error(e: ReviewError) -> AppError {
    match e {
        ReviewError::ValidationError(msg) => AppError::ValidationError(msg),
        ReviewError::ExternalServiceError(msg) => AppError::ExternalService(msg),
    }
}

#[axum::debug_handler]
pub async fn get_provider_reviews(
    State(config): State<Arc<AppConfig>>,
    Path(provider_id): Path<String>,
) -> Result<Json<ProviderReviewsResponse>, AppError> {
    let service = ReviewService::new(&config);

    let response = service
        .list_for_provider(&provider_id)
        .await
        .map_err(map_review_error)?;

    Ok(Json(response))
}

#[axum::debug_handler]
pub async fn create_review(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateReviewRequest>,
) -> Result<Json<Value>, AppError> {
    require_role(&user, UserRole::Patient)?;

    let service = ReviewService::new(&config);

    let review = service
        .create_review(&user.id, &request, auth.token())
        .await
        .map_err(map_review_error)?;

    Ok(Json(json!({
        "success": true,
        "review": review
    })))
}
