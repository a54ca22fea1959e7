//! iqhook Core Library
//!
//! Event models, webhook classification and decoding, and the subscription
//! registry that fans Nexus IQ webhook events out to in-process consumers.

pub mod client;
pub mod crypto;
pub mod error;
pub mod fanout;
pub mod models;
pub mod webhook;

pub use error::{IqError, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
