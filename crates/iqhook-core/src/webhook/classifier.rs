//! Recognizes Nexus IQ webhooks from request headers.

use crate::error::{IqError, Result};
use crate::models::EventKind;

/// Header carrying the event kind's wire identifier.
pub const WEBHOOK_ID_HEADER: &str = "X-Nexus-Webhook-Id";

/// Header carrying the optional HMAC of the body.
pub const SIGNATURE_HEADER: &str = "X-Nexus-Webhook-Signature";

pub const USER_AGENT_HEADER: &str = "User-Agent";

/// Prefix of the `User-Agent` sent by IQ servers.
pub const IQ_USER_AGENT_PREFIX: &str = "Sonatype_CLM_Server";

/// Verdict on the request's `User-Agent`.
///
/// Advisory only: it never decides whether a request is a webhook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAgentCheck {
    Absent,
    Trusted,
    Untrusted,
}

/// Result of inspecting a request's headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// Raw `X-Nexus-Webhook-Id` value. Not validated against [`EventKind`].
    pub webhook_id: Option<String>,
    pub user_agent: UserAgentCheck,
    /// First `User-Agent` value that failed the prefix check. Always `None`
    /// once any `User-Agent` passed it.
    pub untrusted_agent: Option<String>,
}

impl Classification {
    pub fn is_webhook(&self) -> bool {
        self.webhook_id.is_some()
    }

    /// Resolves the identifier to a known kind, if it is one.
    pub fn kind(&self) -> Option<EventKind> {
        self.webhook_id.as_deref().and_then(|id| id.parse().ok())
    }

    /// Returns the raw identifier or [`IqError::NotAWebhook`].
    pub fn require_webhook(&self) -> Result<&str> {
        self.webhook_id.as_deref().ok_or(IqError::NotAWebhook)
    }
}

/// Classifies a request from its `(name, value)` header pairs.
///
/// Header names are matched case-insensitively and in any order. The first
/// `X-Nexus-Webhook-Id` wins. A `User-Agent` that does not start with
/// [`IQ_USER_AGENT_PREFIX`] is noted and skipped; it does not reject the request.
pub fn classify<'a, I>(headers: I) -> Classification
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut classification = Classification {
        webhook_id: None,
        user_agent: UserAgentCheck::Absent,
        untrusted_agent: None,
    };

    for (name, value) in headers {
        if name.eq_ignore_ascii_case(USER_AGENT_HEADER) {
            if value.starts_with(IQ_USER_AGENT_PREFIX) {
                classification.user_agent = UserAgentCheck::Trusted;
                classification.untrusted_agent = None;
            } else if classification.user_agent == UserAgentCheck::Absent {
                classification.user_agent = UserAgentCheck::Untrusted;
                classification.untrusted_agent = Some(value.to_string());
            }
            continue;
        }

        if name.eq_ignore_ascii_case(WEBHOOK_ID_HEADER) && classification.webhook_id.is_none() {
            classification.webhook_id = Some(value.to_string());
        }
    }

    classification
}
