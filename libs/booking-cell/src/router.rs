use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn booking_routes(state: Arc<AppConfig>) -> Router {
    let public_routes = Router::new()
        .route("/services", get(handlers::get_services))
        .route("/payment-methods", get(handlers::get_payment_methods));

    let protected_routes = Router::new()
        .route("/", post(handlers::create_booking))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
