//! Test utilities for iqhook-server integration tests.

use axum::Router;
use iqhook_core::{
    crypto::hmac_sha1_hex,
    fanout::SubscriptionRegistry,
    models::EventKind,
    webhook::samples::sample_payload,
};
use secrecy::SecretString;

use crate::build_app;
use crate::state::{AppState, ServerConfig};

/// Webhook secret used by signature tests.
pub const TEST_WEBHOOK_SECRET: &str = "test-webhook-secret-12345";

/// A User-Agent as sent by a Nexus IQ server.
pub const IQ_USER_AGENT: &str = "Sonatype_CLM_Server/1.170.0-01";

/// Configuration for tests: no secret, advisory User-Agent check and no
/// event logger subscriptions, so the registry starts empty.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        bind_addr: ([127, 0, 0, 1], 0).into(),
        log_events: Vec::new(),
        ..ServerConfig::default()
    }
}

/// Same as [`test_config`] with signature verification enabled.
pub fn test_config_with_secret() -> ServerConfig {
    ServerConfig {
        webhook_secret: Some(SecretString::from(TEST_WEBHOOK_SECRET.to_string())),
        ..test_config()
    }
}

/// Creates application state around a fresh registry.
pub fn setup_test_state(config: ServerConfig) -> AppState {
    AppState::new(config, SubscriptionRegistry::new())
}

/// Creates a test application with the default test configuration.
pub fn create_test_app() -> Router {
    create_test_app_with_state().0
}

/// Creates a test application and returns the state so tests can
/// subscribe to the registry it dispatches into.
pub fn create_test_app_with_state() -> (Router, AppState) {
    create_test_app_with_config(test_config())
}

/// Creates a test application with a custom configuration.
pub fn create_test_app_with_config(config: ServerConfig) -> (Router, AppState) {
    let state = setup_test_state(config);
    (build_app(state.clone()), state)
}

/// Serialized sample payload for a kind.
pub fn sample_body(kind: EventKind) -> Vec<u8> {
    sample_payload(kind)
        .to_json()
        .expect("sample payloads serialize")
}

/// Signature header value for `body` under [`TEST_WEBHOOK_SECRET`].
pub fn sign(body: &[u8]) -> String {
    hmac_sha1_hex(TEST_WEBHOOK_SECRET.as_bytes(), body)
}
