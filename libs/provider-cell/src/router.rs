use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn provider_routes(state: Arc<AppConfig>) -> Router {
    // Search, detail, and availability are public; verification is admin only.
    let public_routes = Router::new()
        .route("/search", get(handlers::search_providers))
        .route("/{provider_id}", get(handlers::get_provider))
        .route("/{provider_id}/availability", get(handlers::get_availability));

    let protected_routes = Router::new()
        .route("/{provider_id}/verify", post(handlers::verify_provider))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
