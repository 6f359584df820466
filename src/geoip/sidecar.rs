//! Checksum sidecar parsing.
//!
//! MaxMind publishes `<archive>.sha256` next to every archive. Its first line is
//! `<hex digest>  <vendor file name>` with exactly two spaces, the vendor file
//! name looking like `GeoLite2-City_20240604.tar.gz`.

use std::path::Path;

use crate::config::DB_SUFFIX;
use crate::error_handling::{GeoIpError, Result};

const SEPARATOR: &str = "  ";

/// Parsed first line of a sidecar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sidecar {
    /// Expected digest of the archive
    pub digest: String,
    /// Name of the archive member holding the database, e.g. `GeoLite2-City.mmdb`
    pub member_name: String,
}

/// Derives the database file name from the vendor archive name.
///
/// Drops everything from the first `.` (extensions), then everything from the
/// first `_` (the release date), and appends `.mmdb`.
pub fn derive_member_name(vendor_file_name: &str) -> String {
    let without_ext = vendor_file_name.split('.').next().unwrap_or_default();
    let stem = without_ext.split('_').next().unwrap_or_default();
    format!("{}.{}", stem, DB_SUFFIX)
}

/// Parses sidecar content.
pub fn parse_sidecar(content: &str) -> Result<Sidecar> {
    let first_line = content
        .lines()
        .next()
        .map(|l| l.trim_end_matches('\r'))
        .unwrap_or_default();
    if first_line.trim().is_empty() {
        return Err(GeoIpError::EmptyChecksumFile);
    }

    let (digest, file_name) = first_line
        .split_once(SEPARATOR)
        .ok_or_else(|| GeoIpError::InvalidChecksumFile(first_line.to_string()))?;
    let digest = digest.trim();
    let file_name = file_name.trim();
    if digest.is_empty() || file_name.is_empty() {
        return Err(GeoIpError::InvalidChecksumFile(first_line.to_string()));
    }

    Ok(Sidecar {
        digest: digest.to_string(),
        member_name: derive_member_name(file_name),
    })
}

/// Reads and parses a downloaded sidecar file.
pub async fn read_sidecar(path: &Path) -> Result<Sidecar> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| GeoIpError::io(path, e))?;
    parse_sidecar(&content)
}
