//! iqhook server library.
//!
//! This library exposes the server components for use in integration tests.

pub mod routes;
pub mod state;
pub mod worker;

use axum::{Router, http::HeaderValue, http::Method};
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use state::{AppState, ServerConfig};
pub use worker::{EventLoggerHandle, start_event_logger};

// Re-export iqhook_core for convenience
pub use iqhook_core;

// Test utilities are available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let origin = match config.dashboard_origin.as_deref().map(HeaderValue::from_str) {
        Some(Ok(origin)) => AllowOrigin::exact(origin),
        Some(Err(e)) => {
            tracing::warn!("Ignoring invalid IQHOOK_DASHBOARD_ORIGIN: {}", e);
            AllowOrigin::from(Any)
        }
        None => AllowOrigin::from(Any),
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any)
}

/// Builds the full application router.
pub fn build_app(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        .nest("/api", routes::api_router(state))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
}
