//! Error handling.
//!
//! This module provides the typed errors of the library and the `ErrorKind`
//! taxonomy:
//! - **InvalidInput**: malformed IP text, surfaced without any I/O
//! - **NotReady**: no index loaded for the requested kind
//! - **Integrity / Format / Transport**: a single download attempt failed;
//!   recovered by falling back to the installed copy when there is one
//! - **Unavailable**: a download cycle failed for a kind that was never installed

mod types;

// Re-export public API
pub use types::{ErrorKind, GeoIpError, InitializationError, ResponseClass};

/// Result alias used across the geoip modules.
pub type Result<T, E = GeoIpError> = std::result::Result<T, E>;
