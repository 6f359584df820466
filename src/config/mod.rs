//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (vendor endpoint, file suffixes, limits)
//! - The `Config` struct shared by the library and the CLI
//! - Log level and format options

mod constants;
mod types;

// Re-export all constants
pub use constants::*;
pub use types::{Config, ConfigError, LogFormat, LogLevel};
