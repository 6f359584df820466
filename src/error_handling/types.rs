//! Error type definitions.
//!
//! This module defines the error types used throughout the application and the
//! coarse `ErrorKind` taxonomy callers branch on.

use std::path::PathBuf;

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

use crate::geoip::DatabaseKind;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),
}

/// Errors produced by the database lifecycle and the lookup API.
#[derive(Error, Debug)]
pub enum GeoIpError {
    /// The lookup input is not an IPv4 or IPv6 address.
    #[error("invalid IP: {0:?}")]
    InvalidIp(String),

    /// Downloads need a MaxMind license key.
    #[error("MAXMIND_LICENSE_KEY is required")]
    LicenseKeyRequired,

    /// The downloaded archive does not match its sidecar digest.
    #[error("checksum mismatch for archive {}: expected {expected}, got {actual}", .path.display())]
    ChecksumMismatch {
        /// Archive that failed verification
        path: PathBuf,
        /// Digest announced by the sidecar
        expected: String,
        /// Digest of the downloaded bytes
        actual: String,
    },

    /// The checksum sidecar has no content.
    #[error("empty SHA256 file")]
    EmptyChecksumFile,

    /// The first sidecar line is not `<digest>  <filename>`.
    #[error("invalid SHA256 file format: {0:?}")]
    InvalidChecksumFile(String),

    /// The archive has no member with the expected file name.
    #[error("{name} not found in archive {}", .archive.display())]
    MemberNotFound {
        /// Expected member file name
        name: String,
        /// Archive that was scanned
        archive: PathBuf,
    },

    /// The vendor endpoint sent more bytes than allowed.
    #[error("download from {url} exceeds {limit} bytes")]
    DownloadTooLarge {
        /// Requested URL with the license key redacted
        url: String,
        /// Configured cap
        limit: u64,
    },

    /// HTTP transport failure or non-success status.
    #[error("download failed: {0}")]
    Transport(#[from] ReqwestError),

    /// A present database file could not be opened as a lookup index.
    #[error("failed to open database: type={kind} path={}: {message}", .path.display())]
    OpenFailed {
        /// Kind being opened
        kind: DatabaseKind,
        /// File that failed to open
        path: PathBuf,
        /// Reason reported by the index library
        message: String,
    },

    /// No index is loaded for the kind.
    #[error("{} database not loaded", .0.label())]
    NotLoaded(DatabaseKind),

    /// A download cycle failed and at least one kind was never installed.
    #[error("failed to download databases and no existing files found (failed: {})", format_kinds(.0))]
    DownloadUnavailable(Vec<DatabaseKind>),

    /// The index answered a query with an error.
    #[error("{kind} lookup failed: {message}")]
    Lookup {
        /// Kind that was queried
        kind: DatabaseKind,
        /// Reason reported by the index library
        message: String,
    },

    /// Filesystem failure.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        /// File or directory involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// A blocking worker panicked or was cancelled.
    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

fn format_kinds(kinds: &[DatabaseKind]) -> String {
    kinds
        .iter()
        .map(|k| k.edition_id())
        .collect::<Vec<_>>()
        .join(", ")
}

impl GeoIpError {
    /// Wraps an `std::io::Error` with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GeoIpError::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns the taxonomy bucket of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            GeoIpError::InvalidIp(_) => ErrorKind::InvalidInput,
            GeoIpError::LicenseKeyRequired => ErrorKind::Configuration,
            GeoIpError::ChecksumMismatch { .. } => ErrorKind::Integrity,
            GeoIpError::EmptyChecksumFile
            | GeoIpError::InvalidChecksumFile(_)
            | GeoIpError::MemberNotFound { .. } => ErrorKind::Format,
            GeoIpError::OpenFailed { .. } => ErrorKind::Open,
            GeoIpError::NotLoaded(_) => ErrorKind::NotReady,
            GeoIpError::DownloadUnavailable(_) => ErrorKind::Unavailable,
            GeoIpError::Transport(_) | GeoIpError::DownloadTooLarge { .. } => ErrorKind::Transport,
            GeoIpError::Lookup { .. } | GeoIpError::Io { .. } | GeoIpError::Task(_) => {
                ErrorKind::Internal
            }
        }
    }
}

/// Coarse error categories.
///
/// Collaborators map these onto user-visible responses with
/// [`ErrorKind::response_class`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum ErrorKind {
    /// Malformed input; no I/O was performed.
    InvalidInput,
    /// Missing or invalid settings such as the license key.
    Configuration,
    /// Checksum mismatch.
    Integrity,
    /// Malformed sidecar or archive.
    Format,
    /// A present database file failed to open.
    Open,
    /// No index loaded for the requested kind.
    NotReady,
    /// No data can be served for at least one kind.
    Unavailable,
    /// HTTP failure while downloading.
    Transport,
    /// Everything else.
    Internal,
}

/// What a caller should show the end user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseClass {
    /// The request itself was wrong.
    ClientError,
    /// Try again later.
    ServiceUnavailable,
    /// Details belong in the logs only.
    InternalError,
}

impl ErrorKind {
    /// Returns a short stable label.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => "invalid input",
            ErrorKind::Configuration => "configuration error",
            ErrorKind::Integrity => "integrity error",
            ErrorKind::Format => "format error",
            ErrorKind::Open => "open error",
            ErrorKind::NotReady => "not ready",
            ErrorKind::Unavailable => "unavailable",
            ErrorKind::Transport => "transport error",
            ErrorKind::Internal => "internal error",
        }
    }

    /// Maps the category onto a user-visible response class.
    pub fn response_class(&self) -> ResponseClass {
        match self {
            ErrorKind::InvalidInput => ResponseClass::ClientError,
            ErrorKind::NotReady => ResponseClass::ServiceUnavailable,
            _ => ResponseClass::InternalError,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_all_error_kinds_have_string_representation() {
        for kind in ErrorKind::iter() {
            assert!(!kind.as_str().is_empty(), "{:?} has no label", kind);
            assert_eq!(kind.to_string(), kind.as_str());
        }
    }

    #[test]
    fn test_response_classes() {
        assert_eq!(
            ErrorKind::InvalidInput.response_class(),
            ResponseClass::ClientError
        );
        assert_eq!(
            ErrorKind::NotReady.response_class(),
            ResponseClass::ServiceUnavailable
        );
        for kind in ErrorKind::iter()
            .filter(|k| !matches!(k, ErrorKind::InvalidInput | ErrorKind::NotReady))
        {
            assert_eq!(kind.response_class(), ResponseClass::InternalError);
        }
    }

    #[test]
    fn test_error_kind_mapping() {
        assert_eq!(
            GeoIpError::InvalidIp("x".into()).kind(),
            ErrorKind::InvalidInput
        );
        assert_eq!(
            GeoIpError::LicenseKeyRequired.kind(),
            ErrorKind::Configuration
        );
        assert_eq!(GeoIpError::EmptyChecksumFile.kind(), ErrorKind::Format);
        assert_eq!(
            GeoIpError::NotLoaded(DatabaseKind::Asn).kind(),
            ErrorKind::NotReady
        );
        assert_eq!(
            GeoIpError::DownloadUnavailable(vec![DatabaseKind::City]).kind(),
            ErrorKind::Unavailable
        );
    }

    #[test]
    fn test_messages_name_the_kind() {
        assert_eq!(
            GeoIpError::NotLoaded(DatabaseKind::Country).to_string(),
            "country database not loaded"
        );
        assert_eq!(
            GeoIpError::NotLoaded(DatabaseKind::Asn).to_string(),
            "ASN database not loaded"
        );
        let msg = GeoIpError::DownloadUnavailable(vec![DatabaseKind::City, DatabaseKind::Asn])
            .to_string();
        assert!(msg.contains("GeoLite2-City, GeoLite2-ASN"), "{}", msg);
    }
}
