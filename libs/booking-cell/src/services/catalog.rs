use tracing::debug;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{BookingError, Service};

pub struct CatalogService {
    supabase: SupabaseClient,
}

impl CatalogService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn list_services(&self) -> Result<Vec<Service>, BookingError> {
        debug!("Fetching service catalog");

        self.supabase
            .select("services", "order=name", None)
            .await
            .map_err(|e| BookingError::ExternalServiceError(e.to_string()))
    }

    pub async fn get_service(&self, service_id: &str) -> Result<Service, BookingError> {
        let rows: Vec<Service> = self
            .supabase
            .select("services", &format!("id=eq.{}", urlencoding::encode(service_id)), None)
            .await
            .map_err(|e| BookingError::ExternalServiceError(e.to_string()))?;

        rows.into_iter().next().ok_or(BookingError::ServiceNotFound)
    }
}

/// Display names for the built-in catalog, used when the store cannot be
/// asked (it seeds the same rows).
pub fn fallback_service_name(service_id: &str) -> &'static str {
    match service_id {
        "general-checkup" => "General Health Checkup",
        "nursing-care" => "Nursing Care",
        "physiotherapy" => "Physiotherapy Session",
        "home-monitoring" => "Home Health Monitoring",
        "elderly-care" => "Elderly Care Assistance",
        _ => "Healthcare Service",
    }
}
