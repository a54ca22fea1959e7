//! Webhook payload decoding for Nexus IQ event kinds.

use serde::de::DeserializeOwned;

use crate::error::{IqError, Result};
use crate::models::{EventKind, EventPayload};

/// Parses a Nexus IQ webhook payload given the raw `X-Nexus-Webhook-Id` value.
///
/// Unknown identifiers yield [`IqError::UnsupportedKind`]; a recognized kind
/// whose body does not match its schema yields [`IqError::Decode`].
pub fn parse_iq_webhook(webhook_id: &str, payload: &[u8]) -> Result<EventPayload> {
    let kind: EventKind = webhook_id.parse()?;
    decode_payload(kind, payload)
}

/// Decodes the body of an already-resolved event kind.
pub fn decode_payload(kind: EventKind, payload: &[u8]) -> Result<EventPayload> {
    match kind {
        EventKind::ApplicationEvaluation => {
            decode(kind, payload).map(EventPayload::ApplicationEvaluation)
        }
        EventKind::ViolationAlert => decode(kind, payload).map(EventPayload::ViolationAlert),
        EventKind::PolicyManagement => decode(kind, payload).map(EventPayload::PolicyManagement),
        EventKind::LicenseOverride => decode(kind, payload).map(EventPayload::LicenseOverride),
        EventKind::SecurityOverride => decode(kind, payload).map(EventPayload::SecurityOverride),
    }
}

fn decode<T: DeserializeOwned>(kind: EventKind, payload: &[u8]) -> Result<T> {
    serde_json::from_slice(payload).map_err(|source| IqError::Decode { kind, source })
}
