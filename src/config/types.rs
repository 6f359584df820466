//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument parsing
//! and configuration.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, ValueEnum};
use thiserror::Error;

use crate::config::constants::{
    DEFAULT_DATA_DIR, DEFAULT_DOWNLOAD_TIMEOUT, DEFAULT_UPDATE_INTERVAL, MAXMIND_HOST,
    MAXMIND_LICENSE_KEY_ENV, MAX_DOWNLOAD_SIZE,
};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// Controls how log messages are formatted:
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Invalid configuration values.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// Auto update is on but the interval is zero.
    #[error("MaxMind auto-update interval must be positive")]
    UpdateIntervalInvalid,

    /// The data directory path is empty.
    #[error("data directory cannot be empty")]
    DataDirEmpty,
}

/// Library configuration.
///
/// Every field doubles as a command-line flag with an environment variable
/// fallback, so the same struct is flattened into the CLI and constructed
/// programmatically in tests.
///
/// # Examples
///
/// ```no_run
/// use geoip_service::Config;
/// use std::path::PathBuf;
///
/// let config = Config {
///     license_key: "YOUR_KEY".to_string(),
///     data_dir: PathBuf::from("/var/lib/geoip"),
///     ..Default::default()
/// };
/// ```
#[derive(Clone, Args)]
pub struct Config {
    /// MaxMind license key used to download GeoLite2 databases
    #[arg(long, env = MAXMIND_LICENSE_KEY_ENV, default_value = "", hide_env_values = true)]
    pub license_key: String,

    /// Directory holding the installed .mmdb files
    #[arg(long, env = "GEOIP_DATA_DIR", default_value = DEFAULT_DATA_DIR)]
    pub data_dir: PathBuf,

    /// Refresh databases periodically in the background
    #[arg(
        long,
        env = "MAXMIND_AUTOUPDATE",
        default_value_t = true,
        action = clap::ArgAction::Set
    )]
    pub auto_update: bool,

    /// Seconds between background refreshes
    #[arg(
        long = "update-interval-secs",
        env = "MAXMIND_AUTOUPDATE_INTERVAL",
        default_value = "86400",
        value_parser = parse_secs
    )]
    pub update_interval: Duration,

    /// Download host, e.g. a mirror of https://download.maxmind.com
    #[arg(long, env = "MAXMIND_HOST", default_value = MAXMIND_HOST)]
    pub download_host: String,

    /// Timeout for a single download in seconds
    #[arg(long = "download-timeout-secs", default_value = "300", value_parser = parse_secs)]
    pub download_timeout: Duration,

    /// Maximum accepted archive size in bytes
    #[arg(long, default_value_t = MAX_DOWNLOAD_SIZE)]
    pub max_download_size: u64,

    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Info, global = true)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain, global = true)]
    pub log_format: LogFormat,
}

fn parse_secs(s: &str) -> Result<Duration, String> {
    s.trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|e| format!("invalid number of seconds '{}': {}", s, e))
}

impl Config {
    /// Checks the values clap cannot check on its own.
    ///
    /// The license key is not checked; downloads report `LicenseKeyRequired`
    /// themselves.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auto_update && self.update_interval.is_zero() {
            return Err(ConfigError::UpdateIntervalInvalid);
        }
        if self.data_dir.as_os_str().is_empty() {
            return Err(ConfigError::DataDirEmpty);
        }
        Ok(())
    }
}

// The license key is a credential; `{:?}` of the config or the CLI must not print it.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let license_key = if self.license_key.is_empty() { "" } else { "***" };
        f.debug_struct("Config")
            .field("license_key", &license_key)
            .field("data_dir", &self.data_dir)
            .field("auto_update", &self.auto_update)
            .field("update_interval", &self.update_interval)
            .field("download_host", &self.download_host)
            .field("download_timeout", &self.download_timeout)
            .field("max_download_size", &self.max_download_size)
            .field("log_level", &self.log_level)
            .field("log_format", &self.log_format)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            license_key: String::new(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            auto_update: true,
            update_interval: DEFAULT_UPDATE_INTERVAL,
            download_host: MAXMIND_HOST.to_string(),
            download_timeout: DEFAULT_DOWNLOAD_TIMEOUT,
            max_download_size: MAX_DOWNLOAD_SIZE,
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        config: Config,
    }

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(
            log::LevelFilter::from(LogLevel::Error),
            log::LevelFilter::Error
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Warn),
            log::LevelFilter::Warn
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Info),
            log::LevelFilter::Info
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Debug),
            log::LevelFilter::Debug
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Trace),
            log::LevelFilter::Trace
        );
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert!(config.auto_update);
        assert_eq!(config.update_interval, DEFAULT_UPDATE_INTERVAL);
        assert_eq!(config.download_host, MAXMIND_HOST);
    }

    #[test]
    fn test_zero_interval_rejected_only_with_auto_update() {
        let mut config = Config {
            update_interval: Duration::ZERO,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::UpdateIntervalInvalid)
        );

        config.auto_update = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_data_dir_rejected() {
        let config = Config {
            data_dir: PathBuf::new(),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::DataDirEmpty));
    }

    #[test]
    fn test_cli_flags_parse() {
        let cli = TestCli::try_parse_from([
            "test",
            "--license-key",
            "abc",
            "--data-dir",
            "/tmp/geo",
            "--auto-update",
            "false",
            "--update-interval-secs",
            "3600",
        ])
        .expect("flags should parse");

        assert_eq!(cli.config.license_key, "abc");
        assert_eq!(cli.config.data_dir, PathBuf::from("/tmp/geo"));
        assert!(!cli.config.auto_update);
        assert_eq!(cli.config.update_interval, Duration::from_secs(3600));
    }

    #[test]
    fn test_debug_redacts_license_key() {
        let config = Config {
            license_key: "s3cr3t-key".to_string(),
            ..Default::default()
        };
        let printed = format!("{:?}", config);
        assert!(!printed.contains("s3cr3t-key"), "{}", printed);
        assert!(printed.contains("license_key: \"***\""), "{}", printed);
        assert!(printed.contains("data_dir"), "{}", printed);

        let unset = format!("{:?}", Config::default());
        assert!(unset.contains("license_key: \"\""), "{}", unset);
    }

    #[test]
    fn test_parse_secs_rejects_garbage() {
        assert!(parse_secs("soon").is_err());
        assert_eq!(parse_secs(" 42 "), Ok(Duration::from_secs(42)));
    }
}
