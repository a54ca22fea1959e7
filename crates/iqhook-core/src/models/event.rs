//! Webhook event kinds.

use serde::{Deserialize, Serialize};

use crate::error::IqError;

/// Kinds of webhook events emitted by a Nexus IQ server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventKind {
    #[serde(rename = "iq:applicationEvaluation")]
    ApplicationEvaluation,
    #[serde(rename = "iq:policyAlert")]
    ViolationAlert,
    #[serde(rename = "iq:policyManagement")]
    PolicyManagement,
    #[serde(rename = "iq:licenseOverrideManagement")]
    LicenseOverride,
    #[serde(rename = "iq:securityVulnerabilityOverrideManagement")]
    SecurityOverride,
}

impl EventKind {
    /// Every kind, in wire-declaration order.
    pub const ALL: [EventKind; 5] = [
        EventKind::ApplicationEvaluation,
        EventKind::ViolationAlert,
        EventKind::PolicyManagement,
        EventKind::LicenseOverride,
        EventKind::SecurityOverride,
    ];

    /// The value carried in the `X-Nexus-Webhook-Id` header.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::ApplicationEvaluation => "iq:applicationEvaluation",
            EventKind::ViolationAlert => "iq:policyAlert",
            EventKind::PolicyManagement => "iq:policyManagement",
            EventKind::LicenseOverride => "iq:licenseOverrideManagement",
            EventKind::SecurityOverride => "iq:securityVulnerabilityOverrideManagement",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for EventKind {
    type Err = IqError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| IqError::UnsupportedKind(s.to_string()))
    }
}
