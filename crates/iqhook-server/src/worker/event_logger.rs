//! Built-in subscriber that logs every received webhook event.

use iqhook_core::{
    fanout::{Subscription, SubscriptionRegistry, Unsubscribe},
    models::{EventKind, EventPayload},
};
use tokio::task::JoinHandle;

/// Handle for the event logger's subscriptions and tasks.
pub struct EventLoggerHandle {
    tasks: Vec<JoinHandle<()>>,
    unsubscribes: Vec<Unsubscribe>,
}

impl EventLoggerHandle {
    /// Number of kinds being logged.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Unsubscribes from every kind and waits for the tasks to drain.
    pub async fn shutdown(self) -> Result<(), tokio::task::JoinError> {
        for unsubscribe in &self.unsubscribes {
            unsubscribe.unsubscribe();
        }
        for task in self.tasks {
            task.await?;
        }
        Ok(())
    }
}

/// Starts one logging task per kind.
pub fn start_event_logger(registry: &SubscriptionRegistry, kinds: &[EventKind]) -> EventLoggerHandle {
    let mut tasks = Vec::with_capacity(kinds.len());
    let mut unsubscribes = Vec::with_capacity(kinds.len());

    for &kind in kinds {
        let (subscription, unsubscribe) = registry.subscribe(kind);
        tasks.push(tokio::spawn(run_event_logger(subscription)));
        unsubscribes.push(unsubscribe);
    }

    EventLoggerHandle { tasks, unsubscribes }
}

/// Main logger loop. Ends once the subscription is removed.
async fn run_event_logger(mut subscription: Subscription) {
    let kind = subscription.kind();
    tracing::info!("Event logger subscribed to {}", kind);

    while let Some(event) = subscription.recv().await {
        tracing::info!("{}", describe_event(&event));
    }

    tracing::info!("Event logger for {} stopped", kind);
}

/// One-line human summary of an event.
pub fn describe_event(event: &EventPayload) -> String {
    match event {
        EventPayload::ApplicationEvaluation(e) => {
            let summary = &e.application_evaluation;
            format!(
                "{}: evaluation {} at stage {} finished with outcome {} ({} critical, {} severe, {} moderate)",
                event.kind(),
                summary.policy_evaluation_id,
                summary.stage,
                summary.outcome,
                summary.critical_component_count,
                summary.severe_component_count,
                summary.moderate_component_count
            )
        }
        EventPayload::ViolationAlert(e) => {
            let highest = e
                .highest_threat_policy()
                .map(|p| format!("{} (threat {})", p.policy_name, p.threat_level))
                .unwrap_or_else(|| "none".to_string());
            format!(
                "{}: {} policy alert(s) for {} at stage {}, highest {}",
                event.kind(),
                e.policy_alerts.len(),
                e.application.public_id,
                e.application_evaluation.stage,
                highest
            )
        }
        EventPayload::PolicyManagement(e) => format!(
            "{}: {} {} changed ({} policies)",
            event.kind(),
            e.owner.owner_type,
            e.owner.public_id,
            e.owner.policies.len()
        ),
        EventPayload::LicenseOverride(e) => format!(
            "{}: license override {} on {} component is {}",
            event.kind(),
            e.license_override.id,
            e.license_override.component_identifier.format,
            e.license_override.status
        ),
        EventPayload::SecurityOverride(e) => format!(
            "{}: security override for {} is {}",
            event.kind(),
            e.security_vulnerability_override.reference_id,
            e.security_vulnerability_override.status
        ),
    }
}
