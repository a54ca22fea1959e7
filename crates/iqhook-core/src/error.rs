//! Error types for the iqhook core library.

use thiserror::Error;

use crate::models::EventKind;

/// Core error type for webhook ingestion and the IQ client capability.
#[derive(Error, Debug)]
pub enum IqError {
    #[error("Request is not a Nexus IQ webhook")]
    NotAWebhook,

    #[error("Unsupported webhook kind: {0}")]
    UnsupportedKind(String),

    #[error("Failed to read request body: {0}")]
    BodyRead(String),

    #[error("Invalid {kind} payload: {source}")]
    Decode {
        kind: EventKind,
        #[source]
        source: serde_json::Error,
    },

    #[error("Untrusted webhook user agent: {0}")]
    UntrustedUserAgent(String),

    #[error("Webhook signature verification failed")]
    SignatureMismatch,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl IqError {
    /// Returns the event kind the failing request was recognized as, if any.
    pub fn kind(&self) -> Option<EventKind> {
        match self {
            IqError::Decode { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

/// Result type alias for iqhook operations.
pub type Result<T> = std::result::Result<T, IqError>;
