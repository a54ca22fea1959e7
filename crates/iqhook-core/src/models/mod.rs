//! Domain models for Nexus IQ webhook events.

pub mod event;
pub mod payload;

pub use event::*;
pub use payload::*;
