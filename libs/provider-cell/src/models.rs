use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Provider {
    pub id: String,
    pub name: String,
    pub specialty: String,
    pub bio: Option<String>,
    pub rating: f32,
    pub review_count: i32,
    pub is_verified: bool,
    pub avatar: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProviderSearchQuery {
    pub specialty: Option<String>,
    pub min_rating: Option<f32>,
    pub verified_only: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProviderSearchResponse {
    pub providers: Vec<Provider>,
    pub total: usize,
}

/// One `provider_availability` row as stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilitySlot {
    pub id: String,
    pub provider_id: String,
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub is_available: bool,
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// Availability window grouped per date, ready for slot pickers. `fallback`
/// is set when the store could not be reached and the canned schedule was
/// served instead.
#[derive(Debug, Serialize, Deserialize)]
pub struct AvailabilityResponse {
    pub provider_id: String,
    pub available_dates: Vec<NaiveDate>,
    pub slots_by_date: BTreeMap<NaiveDate, Vec<String>>,
    pub fallback: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Provider not found")]
    NotFound,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("External service error: {0}")]
    ExternalServiceError(String),
}
