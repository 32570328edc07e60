use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: String,
    pub provider_id: String,
    pub patient_id: String,
    pub rating: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateReviewRequest {
    pub provider_id: String,
    pub rating: i32,
    pub comment: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProviderReviewsResponse {
    pub reviews: Vec<Review>,
    pub average_rating: f64,
    pub total: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("External service error: {0}")]
    ExternalServiceError(String),
}
