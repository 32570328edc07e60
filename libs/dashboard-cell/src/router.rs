use std::sync::Arc;

use axum::{middleware, routing::get, Router};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn dashboard_routes(state: Arc<AppConfig>) -> Router {
    let protected_routes = Router::new()
        .route("/patient", get(handlers::patient_dashboard))
        .route("/provider", get(handlers::provider_dashboard))
        .route("/admin", get(handlers::admin_dashboard))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(protected_routes)
        .with_state(state)
}
