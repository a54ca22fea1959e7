//! Subscriber-side handles.

use std::sync::Arc;

use tokio::sync::mpsc;
use ulid::Ulid;

use crate::models::{EventKind, EventPayload};

/// A payload shared by every subscriber it was delivered to.
pub type SharedPayload = Arc<EventPayload>;

/// Unique identifier for a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub Ulid);

impl SubscriptionId {
    /// Creates a new random subscription ID.
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for SubscriptionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Receiving end of a subscription.
///
/// Holds at most one undelivered event. Once the subscription is removed from
/// its registry and the buffered event (if any) is read, `recv` yields `None`.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriptionId,
    kind: EventKind,
    rx: mpsc::Receiver<SharedPayload>,
}

impl Subscription {
    pub(crate) fn new(id: SubscriptionId, kind: EventKind, rx: mpsc::Receiver<SharedPayload>) -> Self {
        Self { id, kind, rx }
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Waits for the next event.
    pub async fn recv(&mut self) -> Option<SharedPayload> {
        self.rx.recv().await
    }

    /// Takes the buffered event without waiting.
    pub fn try_recv(&mut self) -> Option<SharedPayload> {
        self.rx.try_recv().ok()
    }
}
