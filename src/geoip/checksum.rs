//! Streaming SHA-256 verification of downloaded archives.

use std::path::Path;

use sha2::{Digest, Sha256};
use tokio::io::AsyncReadExt;

use crate::config::IO_BUFFER_SIZE;
use crate::error_handling::{GeoIpError, Result};

/// Computes the SHA-256 of a file, streaming to avoid loading it all into memory.
///
/// Returns the lowercase hex-encoded digest, the encoding MaxMind sidecars use.
pub async fn compute_digest(path: &Path) -> Result<String> {
    let mut file = tokio::fs::File::open(path)
        .await
        .map_err(|e| GeoIpError::io(path, e))?;

    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; IO_BUFFER_SIZE];

    loop {
        let n = file
            .read(&mut buf)
            .await
            .map_err(|e| GeoIpError::io(path, e))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Checks a file against an expected hex digest.
///
/// A mismatch is `Ok(false)`; the caller decides what to do about it.
pub async fn verify(path: &Path, expected: &str) -> Result<bool> {
    let actual = compute_digest(path).await?;
    Ok(digests_match(&actual, expected))
}

/// Compares two hex digests, ignoring case and surrounding whitespace.
pub fn digests_match(actual: &str, expected: &str) -> bool {
    actual.trim().eq_ignore_ascii_case(expected.trim())
}
