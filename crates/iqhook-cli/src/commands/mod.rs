//! CLI command implementations.

pub mod send;
pub mod server;
