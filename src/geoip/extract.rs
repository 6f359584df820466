//! Archive extraction utilities.
//!
//! This module streams a single `.mmdb` member out of a MaxMind tar.gz archive
//! without unpacking the rest of it.

use std::fs::File;
use std::io::{BufReader, Write};
use std::path::Path;

use flate2::read::GzDecoder;
use tar::Archive;

use crate::error_handling::{GeoIpError, Result};

/// Copies the archive member whose file name is `member_name` into `dest`.
///
/// Archives nest the database in a dated directory
/// (`GeoLite2-City_20240101/GeoLite2-City.mmdb`), so only the last path
/// component is compared. Returns the number of bytes copied.
pub fn extract_member<W: Write>(archive_path: &Path, member_name: &str, dest: &mut W) -> Result<u64> {
    log::debug!(
        "Extracting {} from {}",
        member_name,
        archive_path.display()
    );

    let file = File::open(archive_path).map_err(|e| GeoIpError::io(archive_path, e))?;
    let mut tar_archive = Archive::new(GzDecoder::new(BufReader::new(file)));

    let entries = tar_archive
        .entries()
        .map_err(|e| GeoIpError::io(archive_path, e))?;

    for entry_result in entries {
        let mut entry = entry_result.map_err(|e| GeoIpError::io(archive_path, e))?;
        let matches = {
            let path = entry.path().map_err(|e| GeoIpError::io(archive_path, e))?;
            path.file_name().and_then(|n| n.to_str()) == Some(member_name)
        };
        if !matches {
            continue;
        }

        let copied =
            std::io::copy(&mut entry, dest).map_err(|e| GeoIpError::io(archive_path, e))?;
        log::info!(
            "Extracted {} from {} ({} bytes)",
            member_name,
            archive_path.display(),
            copied
        );
        return Ok(copied);
    }

    Err(GeoIpError::MemberNotFound {
        name: member_name.to_string(),
        archive: archive_path.to_path_buf(),
    })
}
