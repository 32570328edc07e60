use serde_json::json;
use tracing::debug;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{Provider, ProviderError, ProviderSearchQuery};

pub struct ProviderService {
    supabase: SupabaseClient,
}

impl ProviderService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn search_providers(
        &self,
        query: &ProviderSearchQuery,
    ) -> Result<Vec<Provider>, ProviderError> {
        debug!("Searching providers: {:?}", query);

        let mut filters: Vec<String> = Vec::new();

        if let Some(specialty) = &query.specialty {
            filters.push(format!("specialty=eq.{}", urlencoding::encode(specialty)));
        }
        if let Some(min_rating) = query.min_rating {
            filters.push(format!("rating=gte.{}", min_rating));
        }
        if query.verified_only.unwrap_or(false) {
            filters.push("is_verified=eq.true".to_string());
        }
        filters.push("order=rating.desc".to_string());

        self.supabase
            .select("providers", &filters.join("&"), None)
            .await
            .map_err(|e| ProviderError::ExternalServiceError(e.to_string()))
    }

    pub async fn get_provider(&self, provider_id: &str) -> Result<Provider, ProviderError> {
        debug!("Fetching provider {}", provider_id);

        let rows: Vec<Provider> = self
            .supabase
            .select("providers", &format!("id=eq.{}", urlencoding::encode(provider_id)), None)
            .await
            .map_err(|e| ProviderError::ExternalServiceError(e.to_string()))?;

        rows.into_iter().next().ok_or(ProviderError::NotFound)
    }

    /// Admin verification: flips `is_verified` and returns the stored row.
    pub async fn set_verified(
        &self,
        provider_id: &str,
        verified: bool,
        auth_token: &str,
    ) -> Result<Provider, ProviderError> {
        debug!("Setting provider {} verified={}", provider_id, verified);

        let updated: Vec<Provider> = self
            .supabase
            .update(
                "providers",
                &format!("id=eq.{}", urlencoding::encode(provider_id)),
                json!({ "is_verified": verified }),
                Some(auth_token),
            )
            .await
            .map_err(|e| ProviderError::ExternalServiceError(e.to_string()))?;

        updated.into_iter().next().ok_or(ProviderError::NotFound)
    }
}
