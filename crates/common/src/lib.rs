//! camtrail Common Utilities
//!
//! Shared infrastructure for all camtrail crates:
//! - Error types and result aliases
//! - Session clock and preview pacing
//! - Tracing/logging initialization
//! - Launch-time configuration defaults

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;
