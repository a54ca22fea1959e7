//! Webhook classification, verification and parsing.

pub mod classifier;
pub mod parser;
pub mod samples;
pub mod verifier;

pub use classifier::*;
pub use parser::*;
pub use verifier::*;
