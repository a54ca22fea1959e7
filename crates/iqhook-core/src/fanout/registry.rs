//! Registry of live subscriptions, keyed by event kind.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use dashmap::DashMap;
use tokio::sync::mpsc;

use super::subscription::{SharedPayload, Subscription, SubscriptionId};
use crate::models::EventKind;

/// Pending events a subscriber may hold before new ones are dropped.
pub const SINK_CAPACITY: usize = 1;

pub(super) type Sink = mpsc::Sender<SharedPayload>;

#[derive(Default)]
pub(super) struct RegistryInner {
    /// Each kind's entry is locked for the duration of a mutation or a
    /// dispatch snapshot, never while sending.
    pub(super) sinks: DashMap<EventKind, HashMap<SubscriptionId, Sink>>,
}

impl RegistryInner {
    pub(super) fn remove(&self, kind: EventKind, id: SubscriptionId) -> bool {
        match self.sinks.get_mut(&kind) {
            Some(mut set) => set.remove(&id).is_some(),
            None => false,
        }
    }

    pub(super) fn snapshot(&self, kind: EventKind) -> Vec<(SubscriptionId, Sink)> {
        self.sinks
            .get(&kind)
            .map(|set| set.iter().map(|(id, sink)| (*id, sink.clone())).collect())
            .unwrap_or_default()
    }
}

/// Maps each [`EventKind`] to the subscribers currently interested in it.
///
/// Cloning is cheap and every clone refers to the same registry. Create one
/// per process (or per test) and hand it to whatever needs it.
#[derive(Clone, Default)]
pub struct SubscriptionRegistry {
    pub(super) inner: Arc<RegistryInner>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers interest in `kind`.
    ///
    /// Returns the receiving end and a handle that removes the subscription.
    pub fn subscribe(&self, kind: EventKind) -> (Subscription, Unsubscribe) {
        let id = SubscriptionId::new();
        let (tx, rx) = mpsc::channel(SINK_CAPACITY);

        {
            let mut set = self.inner.sinks.entry(kind).or_default();
            // Receivers dropped without unsubscribing
            set.retain(|_, sink| !sink.is_closed());
            set.insert(id, tx);
        }
        tracing::debug!("Subscription {} registered for {}", id, kind);

        let unsubscribe = Unsubscribe {
            registry: Arc::downgrade(&self.inner),
            kind,
            id,
        };
        (Subscription::new(id, kind, rx), unsubscribe)
    }

    /// Removes a subscription. Returns `false` if it was already gone.
    pub fn unsubscribe(&self, kind: EventKind, id: SubscriptionId) -> bool {
        let removed = self.inner.remove(kind, id);
        if removed {
            tracing::debug!("Subscription {} removed from {}", id, kind);
        }
        removed
    }

    /// Number of live subscriptions for `kind`.
    ///
    /// Subscriptions whose receiver was dropped are not counted, even before
    /// a dispatch prunes them.
    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.inner
            .sinks
            .get(&kind)
            .map(|set| set.values().filter(|sink| !sink.is_closed()).count())
            .unwrap_or(0)
    }

    /// Subscriber counts for every kind, in [`EventKind::ALL`] order.
    pub fn stats(&self) -> Vec<(EventKind, usize)> {
        EventKind::ALL
            .into_iter()
            .map(|kind| (kind, self.subscriber_count(kind)))
            .collect()
    }

    /// Total live subscriptions across all kinds.
    pub fn total(&self) -> usize {
        self.stats().iter().map(|(_, count)| count).sum()
    }
}

/// Removes one subscription from its registry.
///
/// Idempotent, and a no-op once the registry itself is gone.
#[derive(Debug, Clone)]
pub struct Unsubscribe {
    registry: Weak<RegistryInner>,
    kind: EventKind,
    id: SubscriptionId,
}

impl Unsubscribe {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Returns `true` only for the call that actually removed the subscription.
    pub fn unsubscribe(&self) -> bool {
        match self.registry.upgrade() {
            Some(inner) => {
                let removed = inner.remove(self.kind, self.id);
                if removed {
                    tracing::debug!("Subscription {} removed from {}", self.id, self.kind);
                }
                removed
            }
            None => false,
        }
    }
}
