//! Typed webhook payloads, one per [`EventKind`].

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::EventKind;

// Only the nesting objects directly under each event are required. Every
// scalar and list below them falls back to its zero value when absent.

/// A decoded webhook payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventPayload {
    ApplicationEvaluation(ApplicationEvaluationEvent),
    ViolationAlert(ViolationAlertEvent),
    PolicyManagement(PolicyManagementEvent),
    LicenseOverride(LicenseOverrideEvent),
    SecurityOverride(SecurityOverrideEvent),
}

impl EventPayload {
    /// Returns the kind this payload was decoded for.
    pub fn kind(&self) -> EventKind {
        match self {
            EventPayload::ApplicationEvaluation(_) => EventKind::ApplicationEvaluation,
            EventPayload::ViolationAlert(_) => EventKind::ViolationAlert,
            EventPayload::PolicyManagement(_) => EventKind::PolicyManagement,
            EventPayload::LicenseOverride(_) => EventKind::LicenseOverride,
            EventPayload::SecurityOverride(_) => EventKind::SecurityOverride,
        }
    }

    /// Serializes the payload back into its wire JSON.
    pub fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        match self {
            EventPayload::ApplicationEvaluation(e) => serde_json::to_vec(e),
            EventPayload::ViolationAlert(e) => serde_json::to_vec(e),
            EventPayload::PolicyManagement(e) => serde_json::to_vec(e),
            EventPayload::LicenseOverride(e) => serde_json::to_vec(e),
            EventPayload::SecurityOverride(e) => serde_json::to_vec(e),
        }
    }
}

// Application evaluation

/// `iq:applicationEvaluation`: an application finished a policy evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationEvaluationEvent {
    #[serde(default)]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub initiator: String,
    #[serde(default)]
    pub id: String,
    pub application_evaluation: EvaluationSummary,
}

/// Summary of a single policy evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EvaluationSummary {
    pub policy_evaluation_id: String,
    pub stage: String,
    pub owner_id: String,
    pub evaluation_date: DateTime<Utc>,
    pub affected_component_count: u32,
    pub critical_component_count: u32,
    pub severe_component_count: u32,
    pub moderate_component_count: u32,
    pub outcome: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_id: Option<String>,
}

// Violation alert

/// `iq:policyAlert`: an evaluation produced new policy violations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViolationAlertEvent {
    #[serde(default)]
    pub initiator: String,
    pub application_evaluation: EvaluationSummary,
    pub application: ApplicationDescriptor,
    #[serde(default)]
    pub policy_alerts: Vec<PolicyAlert>,
}

impl ViolationAlertEvent {
    /// Returns the alert with the highest threat level.
    ///
    /// Ties go to the alert that appears first; `None` when there are no alerts.
    pub fn highest_threat_policy(&self) -> Option<&PolicyAlert> {
        highest_threat_policy(&self.policy_alerts)
    }
}

/// Finds the first alert carrying the maximum threat level.
pub fn highest_threat_policy(alerts: &[PolicyAlert]) -> Option<&PolicyAlert> {
    alerts.iter().fold(None, |best, alert| match best {
        Some(current) if current.threat_level >= alert.threat_level => Some(current),
        _ => Some(alert),
    })
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApplicationDescriptor {
    pub id: String,
    pub public_id: String,
    pub name: String,
    pub organization_id: String,
}

/// A policy that was violated, with the component facts that triggered it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PolicyAlert {
    pub policy_id: String,
    pub policy_name: String,
    pub threat_level: u8,
    #[serde(default)]
    pub component_facts: Vec<ComponentFact>,
    pub policy_violation_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ComponentFact {
    pub component_identifier: ComponentIdentifier,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default)]
    pub pathnames: Vec<String>,
    #[serde(default)]
    pub constraint_facts: Vec<ConstraintFact>,
}

/// Format plus format-specific coordinates (e.g. maven groupId/artifactId/version).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ComponentIdentifier {
    pub format: String,
    #[serde(default)]
    pub coordinates: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConstraintFact {
    pub constraint_name: String,
    #[serde(default)]
    pub satisfied_conditions: Vec<SatisfiedCondition>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SatisfiedCondition {
    pub summary: String,
    pub reason: String,
}

// Policy management

/// `iq:policyManagement`: policies or settings of an owner changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyManagementEvent {
    pub owner: Owner,
}

/// An organization or application that owns policies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Owner {
    pub id: String,
    pub public_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_owner_id: Option<String>,
    #[serde(rename = "type")]
    pub owner_type: String,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub labels: Vec<Label>,
    #[serde(default)]
    pub license_threat_groups: Vec<LicenseThreatGroup>,
    #[serde(default)]
    pub policies: Vec<Policy>,
    #[serde(default)]
    pub access_entries: Vec<AccessEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Tag {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub color: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Label {
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub color: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LicenseThreatGroup {
    pub id: String,
    pub name: String,
    pub threat_level: u8,
    pub category: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Policy {
    pub id: String,
    pub name: String,
    pub owner_id: String,
    pub owner_type: String,
    pub threat_level: u8,
    pub policy_type: String,
}

/// Role assignment on an owner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AccessEntry {
    pub role_id: String,
    pub role_name: String,
    #[serde(default)]
    pub members: Vec<RoleMember>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RoleMember {
    #[serde(rename = "type")]
    pub member_type: String,
    pub user_or_group_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub realm: Option<String>,
}

// Overrides

/// `iq:licenseOverrideManagement`: a license override was created or changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseOverrideEvent {
    pub license_override: LicenseOverride,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LicenseOverride {
    pub id: String,
    pub owner_id: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default)]
    pub license_ids: Vec<String>,
    pub component_identifier: ComponentIdentifier,
}

/// `iq:securityVulnerabilityOverrideManagement`: a security override was created or changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityOverrideEvent {
    pub security_vulnerability_override: SecurityOverride,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SecurityOverride {
    pub id: String,
    pub owner_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    pub source: String,
    pub reference_id: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}
