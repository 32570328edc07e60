use chrono::Utc;
use serde_json::json;
use tracing::debug;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{CreateReviewRequest, ProviderReviewsResponse, Review, ReviewError};

pub struct ReviewService {
    supabase: SupabaseClient,
}

impl ReviewService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn list_for_provider(
        &self,
        provider_id: &str,
    ) -> Result<ProviderReviewsResponse, ReviewError> {
        debug!("Listing reviews for provider {}", provider_id);

        let reviews: Vec<Review> = self
            .supabase
            .select(
                "reviews",
                &format!(
                    "provider_id=eq.{}&order=created_at.desc",
                    urlencoding::encode(provider_id)
                ),
                None,
            )
            .await
            .map_err(|e| ReviewError::ExternalServiceError(e.to_string()))?;

        Ok(summarize(reviews))
    }

    pub async fn create_review(
        &self,
        patient_id: &str,
        request: &CreateReviewRequest,
        auth_token: &str,
    ) -> Result<Review, ReviewError> {
        if !(1..=5).contains(&request.rating) {
            return Err(ReviewError::ValidationError(
                "Rating must be between 1 and 5".to_string(),
            ));
        }
        if request.comment.trim().is_empty() {
            return Err(ReviewError::ValidationError("Comment is required".to_string()));
        }

        let row = json!({
            "provider_id": request.provider_id,
            "patient_id": patient_id,
            "rating": request.rating,
            "comment": request.comment,
            "created_at": Utc::now().to_rfc3339(),
        });

        self.supabase
            .insert("reviews", row, Some(auth_token))
            .await
            .map_err(|e| ReviewError::ExternalServiceError(e.to_string()))
    }
}

/// Aggregate a provider's reviews: newest-first list plus a one-decimal
/// average rating.
fn summarize(reviews: Vec<Review>) -> ProviderReviewsResponse {
    let total = reviews.len();
    let average_rating = if total == 0 {
        0.0
    } else {
        let sum: i32 = reviews.iter().map(|r| r.rating).sum();
        (f64::from(sum) / total as f64 * 10.0).round() / 10.0
    };

    ProviderReviewsResponse {
        reviews,
        average_rating,
        total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review(rating: i32) -> Review {
        Review {
            id: format!("r-{}", rating),
            provider_id: "1".to_string(),
            patient_id: "patient-1".to_string(),
            rating,
            comment: "fine".to_string(),
            created_at: Utc::now(),
            patient_name: None,
        }
    }

    #[test]
    fn average_rounds_to_one_decimal() {
        let response = summarize(vec![review(5), review(4), review(4)]);
        assert_eq!(response.average_rating, 4.3);
        assert_eq!(response.total, 3);
    }

    #[test]
    fn empty_review_list_averages_zero() {
        let response = summarize(Vec::new());
        assert_eq!(response.average_rating, 0.0);
        assert_eq!(response.total, 0);
    }
}
