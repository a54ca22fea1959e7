//! Webhook endpoint handlers for Nexus IQ.

use axum::{
    Json,
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use iqhook_core::{
    IqError,
    models::{EventKind, EventPayload},
    webhook::{SIGNATURE_HEADER, SignatureVerifier, UserAgentCheck, classify, parse_iq_webhook},
};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde_json::{Value, json};

use crate::state::AppState;

/// Maps an ingest failure to its status code and `{"error": ...}` body.
fn reject(err: &IqError) -> (StatusCode, Json<Value>) {
    let status = match err {
        IqError::SignatureMismatch => StatusCode::UNAUTHORIZED,
        _ => StatusCode::BAD_REQUEST,
    };
    (status, Json(json!({ "error": err.to_string() })))
}

/// Header pairs with a UTF-8 value, as the classifier consumes them.
fn header_pairs(headers: &HeaderMap) -> impl Iterator<Item = (&str, &str)> {
    headers
        .iter()
        .filter_map(|(name, value)| value.to_str().ok().map(|value| (name.as_str(), value)))
}

/// Runs a request through classification, body read, signature check and decode.
async fn ingest(state: &AppState, request: Request) -> Result<EventPayload, IqError> {
    let (parts, body) = request.into_parts();

    // 1. Classify from headers
    let classification = classify(header_pairs(&parts.headers));
    let webhook_id = classification.require_webhook()?;

    if classification.user_agent != UserAgentCheck::Trusted {
        let agent = classification.untrusted_agent.as_deref().unwrap_or("<none>");
        if state.config.require_user_agent {
            return Err(IqError::UntrustedUserAgent(agent.to_string()));
        }
        tracing::debug!("Accepting {} webhook from user agent {}", webhook_id, agent);
    }

    // 2. Read body (bounded)
    let body = axum::body::to_bytes(body, state.config.max_body_bytes)
        .await
        .map_err(|e| IqError::BodyRead(e.to_string()))?;

    // 3. Verify signature (only when a secret is configured)
    if let Some(secret) = &state.config.webhook_secret {
        let signature = parts
            .headers
            .get(SIGNATURE_HEADER)
            .and_then(|v| v.to_str().ok());

        if !SignatureVerifier::new(secret.expose_secret()).verify(signature, &body) {
            return Err(IqError::SignatureMismatch);
        }
    }

    // 4. Decode payload
    parse_iq_webhook(webhook_id, &body)
}

/// Handler for Nexus IQ webhooks.
///
/// POST /api/webhooks/iq
pub async fn handle_iq_webhook(State(state): State<AppState>, request: Request) -> impl IntoResponse {
    let payload = match ingest(&state, request).await {
        Ok(payload) => payload,
        Err(e) => {
            match e.kind() {
                Some(kind) => tracing::warn!("Rejected {} webhook: {}", kind, e),
                None => tracing::warn!("Rejected webhook: {}", e),
            }
            return reject(&e);
        }
    };

    // 5. Fan out to subscribers (never blocks)
    let kind = payload.kind();
    let outcome = state.registry.dispatch(payload);
    tracing::debug!(
        "Dispatched {} webhook: {} delivered, {} dropped, {} closed",
        kind,
        outcome.delivered,
        outcome.dropped,
        outcome.closed
    );

    // 6. Return 200 OK
    (
        StatusCode::OK,
        Json(json!({
            "status": "accepted",
            "kind": kind,
            "delivered": outcome.delivered
        })),
    )
}

#[derive(Serialize)]
struct KindSubscriptions {
    kind: EventKind,
    subscribers: usize,
}

#[derive(Serialize)]
struct SubscriptionStatsResponse {
    total: usize,
    kinds: Vec<KindSubscriptions>,
}

/// Live subscriber counts per event kind.
///
/// GET /api/webhooks/subscriptions
pub async fn list_subscriptions(State(state): State<AppState>) -> impl IntoResponse {
    let kinds: Vec<_> = state
        .registry
        .stats()
        .into_iter()
        .map(|(kind, subscribers)| KindSubscriptions { kind, subscribers })
        .collect();
    let total = kinds.iter().map(|k| k.subscribers).sum();

    Json(SubscriptionStatsResponse { total, kinds })
}
