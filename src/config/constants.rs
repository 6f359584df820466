//! Configuration constants.
//!
//! This module defines all configuration constants used throughout the application,
//! including the vendor download endpoint, file naming and operational limits.

use std::time::Duration;

/// MaxMind download host (scheme + authority, no trailing slash)
pub const MAXMIND_HOST: &str = "https://download.maxmind.com";

/// Path of the MaxMind download endpoint, appended to the host
pub const MAXMIND_DOWNLOAD_PATH: &str = "/app/geoip_download";

/// Environment variable name for MaxMind license key
pub const MAXMIND_LICENSE_KEY_ENV: &str = "MAXMIND_LICENSE_KEY";

/// `suffix` query value for the database archive
pub const ARCHIVE_SUFFIX: &str = "tar.gz";

/// `suffix` query value for the SHA-256 sidecar of the archive
pub const CHECKSUM_SUFFIX: &str = "tar.gz.sha256";

/// Extension of installed database files
pub const DB_SUFFIX: &str = "mmdb";

/// Default directory holding installed databases
pub const DEFAULT_DATA_DIR: &str = "./data";

/// Default refresh interval (24 hours)
pub const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Default timeout for a single vendor download
pub const DEFAULT_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(300);

/// Maximum accepted size of a downloaded archive (200MB)
pub const MAX_DOWNLOAD_SIZE: u64 = 200 * 1024 * 1024;

/// Locale key used for display names in vendor records
pub const DISPLAY_LOCALE: &str = "en";

/// Buffer size for streaming file reads (64 KiB)
pub const IO_BUFFER_SIZE: usize = 64 * 1024;
