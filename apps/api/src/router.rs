use std::sync::Arc;

use axum::{routing::get, Router};

use appointment_cell::router::appointment_routes;
use auth_cell::router::auth_routes;
use booking_cell::router::booking_routes;
use dashboard_cell::router::dashboard_routes;
use provider_cell::router::provider_routes;
use review_cell::router::review_routes;
use shared_config::AppConfig;

pub fn create_router(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(|| async { "CareLink API is running!" }))
        .nest("/auth", auth_routes(state.clone()))
        .nest("/providers", provider_routes(state.clone()))
        .nest("/bookings", booking_routes(state.clone()))
        .nest("/appointments", appointment_routes(state.clone()))
        .nest("/reviews", review_routes(state.clone()))
        .nest("/dashboards", dashboard_routes(state.clone()))
}
