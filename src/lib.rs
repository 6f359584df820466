//! geoip_service library: MaxMind GeoLite2 database lifecycle and IP lookups
//!
//! This library downloads the GeoLite2 Country, City and ASN databases,
//! verifies each archive against its published SHA-256, installs the database
//! atomically, keeps one open index per database and answers lookups while the
//! databases are refreshed in the background.
//!
//! # Example
//!
//! ```no_run
//! use geoip_service::initialization::init_client;
//! use geoip_service::{Config, GeoIpManager};
//! use tokio_util::sync::CancellationToken;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     license_key: "your-license-key".to_string(),
//!     ..Default::default()
//! };
//! let manager = GeoIpManager::new(init_client(&config)?, config);
//!
//! manager.sync().await?;
//! let cancel = CancellationToken::new();
//! let refresh = manager.start_auto_update(cancel.clone());
//!
//! let city = manager.service().ip2_city("81.2.69.160").await?;
//! println!("{:?} {:?}", city.city, city.country.iso_country_code);
//! # cancel.cancel();
//! # if let Some(task) = refresh { task.await?; }
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your application
//! or ensure you're calling library functions within an async context.

pub mod app;
pub mod config;
pub mod error_handling;
pub mod geoip;
pub mod initialization;

// Re-export public API
pub use config::{Config, LogFormat, LogLevel};
pub use error_handling::{ErrorKind, GeoIpError, ResponseClass};
pub use geoip::{
    DatabaseKind, DownloadReport, Downloader, GeoIp, GeoIpManager, GeoIpService, GeoLookupError,
    IpAsn, IpCity, IpCountry, ReaderRegistry, RefreshScheduler,
};
