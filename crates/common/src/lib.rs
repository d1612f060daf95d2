//! Moodscan Common Utilities
//!
//! Shared infrastructure for all Moodscan crates:
//! - Error types and result aliases
//! - Configuration loading
//! - Tracing/logging initialization
//! - The notification sink injected into sessions and the orchestrator

pub mod config;
pub mod error;
pub mod logging;
pub mod notify;

pub use config::*;
pub use error::*;
pub use notify::*;
