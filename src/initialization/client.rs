//! HTTP client initialization.

use reqwest::ClientBuilder;

use crate::config::Config;

/// Initializes the HTTP client used for database downloads.
///
/// The whole request, body included, is bounded by `download_timeout`.
///
/// # Errors
///
/// Returns a `reqwest::Error` if client creation fails.
pub fn init_client(config: &Config) -> Result<reqwest::Client, reqwest::Error> {
    ClientBuilder::new()
        .timeout(config.download_timeout)
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
}
