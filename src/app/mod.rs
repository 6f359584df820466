//! Main application modules.
//!
//! This module provides the shutdown handling used by the long-running
//! `run` command.

pub mod shutdown;

// Re-export public API
pub use shutdown::shutdown_gracefully;
