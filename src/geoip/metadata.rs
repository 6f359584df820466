//! Metadata of opened GeoIP databases.

use std::path::Path;

use maxminddb::Reader;

use super::types::IndexMetadata;

/// Extracts metadata from a GeoIP database.
///
/// MaxMind databases carry their type and a build epoch in the metadata
/// section; the build epoch is what changes between weekly releases.
pub(crate) fn extract_metadata<T: AsRef<[u8]>>(reader: &Reader<T>, path: &Path) -> IndexMetadata {
    IndexMetadata {
        database_type: reader.metadata.database_type.clone(),
        build_epoch: reader.metadata.build_epoch,
        ip_version: reader.metadata.ip_version,
        path: path.to_path_buf(),
    }
}
