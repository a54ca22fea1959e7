//! In-process fan-out of decoded webhook events.
//!
//! Consumers call [`SubscriptionRegistry::subscribe`] for the kinds they care
//! about; the ingest path calls [`SubscriptionRegistry::dispatch`] once per
//! decoded event. Each subscription buffers a single event and newer events
//! are dropped while it is full, so a slow consumer never stalls ingestion.

pub mod dispatch;
pub mod registry;
pub mod subscription;

pub use dispatch::DispatchOutcome;
pub use registry::{SINK_CAPACITY, SubscriptionRegistry, Unsubscribe};
pub use subscription::{SharedPayload, Subscription, SubscriptionId};
