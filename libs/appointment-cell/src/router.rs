use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn appointment_routes(state: Arc<AppConfig>) -> Router {
    // All appointment operations require authentication
    let protected_routes = Router::new()
        .route("/{appointment_id}", get(handlers::get_appointment))
        .route("/{appointment_id}/status", post(handlers::update_status))
        .route("/{appointment_id}/reschedule", post(handlers::reschedule_appointment))
        .route("/patients/{patient_id}", get(handlers::get_patient_appointments))
        .route("/providers/{provider_id}", get(handlers::get_provider_appointments))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(protected_routes)
        .with_state(state)
}
