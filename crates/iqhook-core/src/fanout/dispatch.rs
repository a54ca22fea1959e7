//! Best-effort delivery of decoded events to subscribers.

use std::sync::Arc;

use tokio::sync::mpsc::error::TrySendError;

use super::registry::SubscriptionRegistry;
use super::subscription::SharedPayload;

/// Tally of a single dispatch. Informational only: dispatch never fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    /// Subscribers whose sink accepted the event.
    pub delivered: usize,
    /// Subscribers whose sink still held an unread event; the new one was dropped.
    pub dropped: usize,
    /// Subscribers whose receiver was gone; they are pruned from the registry.
    pub closed: usize,
}

impl DispatchOutcome {
    /// Number of subscribers the dispatch saw in its snapshot.
    pub fn attempted(&self) -> usize {
        self.delivered + self.dropped + self.closed
    }
}

impl SubscriptionRegistry {
    /// Offers `payload` to every subscriber of its kind without blocking.
    ///
    /// The subscriber set is snapshotted under the kind's lock and the sends
    /// happen after the lock is released, so subscriptions added later never
    /// see this event. A subscriber whose single slot is occupied loses the
    /// new event (drop-newest) and nobody else is affected.
    pub fn dispatch(&self, payload: impl Into<SharedPayload>) -> DispatchOutcome {
        let payload = payload.into();
        let kind = payload.kind();
        let sinks = self.inner.snapshot(kind);

        let mut outcome = DispatchOutcome::default();
        for (id, sink) in sinks {
            match sink.try_send(Arc::clone(&payload)) {
                Ok(()) => outcome.delivered += 1,
                Err(TrySendError::Full(_)) => {
                    tracing::debug!("Subscriber {} has an unread {} event, dropping", id, kind);
                    outcome.dropped += 1;
                }
                Err(TrySendError::Closed(_)) => {
                    tracing::debug!("Subscriber {} for {} is gone, pruning", id, kind);
                    self.inner.remove(kind, id);
                    outcome.closed += 1;
                }
            }
        }

        outcome
    }
}
