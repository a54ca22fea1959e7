//! Representative payloads for each event kind.
//!
//! Used by tests and by `iqhook send` when no payload file is given.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::models::*;

fn sample_time(offset_secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(1_714_657_500 + offset_secs, 0).unwrap_or_default()
}

fn maven_component(artifact_id: &str, version: &str) -> ComponentIdentifier {
    let mut coordinates = BTreeMap::new();
    coordinates.insert("groupId".to_string(), "org.apache.commons".to_string());
    coordinates.insert("artifactId".to_string(), artifact_id.to_string());
    coordinates.insert("version".to_string(), version.to_string());
    coordinates.insert("extension".to_string(), "jar".to_string());
    ComponentIdentifier {
        format: "maven".to_string(),
        coordinates,
    }
}

fn evaluation_summary() -> EvaluationSummary {
    EvaluationSummary {
        policy_evaluation_id: "2ad4c1b8e23c4ab1a3bc4fbd6e0a1b27".to_string(),
        stage: "build".to_string(),
        owner_id: "7a2bd7f4c3bd4e59b2ac0e7c38e3b2a9".to_string(),
        evaluation_date: sample_time(-30),
        affected_component_count: 12,
        critical_component_count: 2,
        severe_component_count: 4,
        moderate_component_count: 6,
        outcome: "fail".to_string(),
        report_id: Some("c1b8f2d0a4e34c6f8e1a2b3c4d5e6f70".to_string()),
    }
}

/// Returns a fully populated sample payload for `kind`.
pub fn sample_payload(kind: EventKind) -> EventPayload {
    match kind {
        EventKind::ApplicationEvaluation => {
            EventPayload::ApplicationEvaluation(ApplicationEvaluationEvent {
                timestamp: sample_time(0),
                initiator: "admin".to_string(),
                id: "9f3c2a1b7d8e4f60a1b2c3d4e5f60718".to_string(),
                application_evaluation: evaluation_summary(),
            })
        }
        EventKind::ViolationAlert => EventPayload::ViolationAlert(ViolationAlertEvent {
            initiator: "ci-bot".to_string(),
            application_evaluation: evaluation_summary(),
            application: ApplicationDescriptor {
                id: "7a2bd7f4c3bd4e59b2ac0e7c38e3b2a9".to_string(),
                public_id: "storefront".to_string(),
                name: "Storefront".to_string(),
                organization_id: "f0e1d2c3b4a5968778695a4b3c2d1e0f".to_string(),
            },
            policy_alerts: vec![
                PolicyAlert {
                    policy_id: "security-high".to_string(),
                    policy_name: "Security-High".to_string(),
                    threat_level: 9,
                    component_facts: vec![ComponentFact {
                        component_identifier: maven_component("commons-text", "1.9"),
                        hash: Some("4f6b1c0e1d7c2a3b9e8f".to_string()),
                        display_name: Some("org.apache.commons : commons-text : 1.9".to_string()),
                        pathnames: vec!["WEB-INF/lib/commons-text-1.9.jar".to_string()],
                        constraint_facts: vec![ConstraintFact {
                            constraint_name: "Critical risk CVSS score".to_string(),
                            satisfied_conditions: vec![SatisfiedCondition {
                                summary: "Security Vulnerability Severity >= 9".to_string(),
                                reason: "Found security vulnerability CVE-2022-42889 with severity 9.8.".to_string(),
                            }],
                        }],
                    }],
                    policy_violation_id: "b3a9c7d1e2f34a5b6c7d8e9f0a1b2c3d".to_string(),
                },
                PolicyAlert {
                    policy_id: "license-copyleft".to_string(),
                    policy_name: "License-Copyleft".to_string(),
                    threat_level: 7,
                    component_facts: vec![],
                    policy_violation_id: "e4d3c2b1a09f8e7d6c5b4a3f2e1d0c9b".to_string(),
                },
            ],
        }),
        EventKind::PolicyManagement => EventPayload::PolicyManagement(PolicyManagementEvent {
            owner: Owner {
                id: "f0e1d2c3b4a5968778695a4b3c2d1e0f".to_string(),
                public_id: "retail".to_string(),
                name: "Retail Division".to_string(),
                parent_owner_id: Some("ROOT_ORGANIZATION_ID".to_string()),
                owner_type: "organization".to_string(),
                tags: vec![Tag {
                    id: "tag-internal".to_string(),
                    name: "Internal".to_string(),
                    description: Some("Not distributed outside the company".to_string()),
                    color: "light-blue".to_string(),
                }],
                labels: vec![Label {
                    id: "label-reviewed".to_string(),
                    label: "Reviewed".to_string(),
                    description: None,
                    color: "light-green".to_string(),
                }],
                license_threat_groups: vec![LicenseThreatGroup {
                    id: "ltg-copyleft".to_string(),
                    name: "Copyleft".to_string(),
                    threat_level: 7,
                    category: "COPYLEFT".to_string(),
                }],
                policies: vec![Policy {
                    id: "security-high".to_string(),
                    name: "Security-High".to_string(),
                    owner_id: "f0e1d2c3b4a5968778695a4b3c2d1e0f".to_string(),
                    owner_type: "ORGANIZATION".to_string(),
                    threat_level: 9,
                    policy_type: "security".to_string(),
                }],
                access_entries: vec![AccessEntry {
                    role_id: "1b92fae3e55a411793a091fb821c422d".to_string(),
                    role_name: "Owner".to_string(),
                    members: vec![RoleMember {
                        member_type: "GROUP".to_string(),
                        user_or_group_name: "retail-leads".to_string(),
                        realm: Some("Internal".to_string()),
                    }],
                }],
            },
        }),
        EventKind::LicenseOverride => EventPayload::LicenseOverride(LicenseOverrideEvent {
            license_override: LicenseOverride {
                id: "0a1b2c3d4e5f60718293a4b5c6d7e8f9".to_string(),
                owner_id: "7a2bd7f4c3bd4e59b2ac0e7c38e3b2a9".to_string(),
                status: "SELECTED".to_string(),
                comment: Some("Dual licensed, we use it under Apache-2.0".to_string()),
                license_ids: vec!["Apache-2.0".to_string()],
                component_identifier: maven_component("commons-lang3", "3.12.0"),
            },
        }),
        EventKind::SecurityOverride => EventPayload::SecurityOverride(SecurityOverrideEvent {
            security_vulnerability_override: SecurityOverride {
                id: "1f2e3d4c5b6a79880716253443526170".to_string(),
                owner_id: "7a2bd7f4c3bd4e59b2ac0e7c38e3b2a9".to_string(),
                hash: Some("4f6b1c0e1d7c2a3b9e8f".to_string()),
                source: "cve".to_string(),
                reference_id: "CVE-2022-42889".to_string(),
                status: "NOT_APPLICABLE".to_string(),
                comment: Some("Interpolation lookups are never fed user input".to_string()),
            },
        }),
    }
}
