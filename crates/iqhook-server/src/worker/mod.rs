//! Background workers consuming dispatched events.

pub mod event_logger;

pub use event_logger::*;
