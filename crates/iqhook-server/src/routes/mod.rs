//! HTTP route handlers.

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

pub mod health;
pub mod webhooks;

/// Routes served under `/api`.
pub fn api_router(state: AppState) -> Router {
    Router::new()
        // Health and version
        .route("/health", get(health::health_check))
        .route("/version", get(health::version))
        // Webhooks (public; optionally signature-verified)
        .route("/webhooks/iq", post(webhooks::handle_iq_webhook))
        .route("/webhooks/subscriptions", get(webhooks::list_subscriptions))
        .with_state(state)
}
