//! Matchdesk Core - Shared data structures and infrastructure
//!
//! This crate defines the error, configuration, logging, and wire-format
//! types shared by the admin API client.

pub mod config;
pub mod error;
pub mod logging;
pub mod types;

pub use config::*;
pub use error::*;
pub use logging::*;
pub use types::*;

// Re-export commonly used external types
pub use tokio;
pub use tracing;
