//! Lookup index capability.
//!
//! The registry and the lookup service only see the `LookupIndex` and
//! `IndexOpener` traits. `MmdbOpener` backs them with the `maxminddb` crate;
//! tests substitute in-memory fakes.

use std::net::IpAddr;
use std::path::{Path, PathBuf};

use maxminddb::Reader;
use serde::de::DeserializeOwned;

use super::metadata::extract_metadata;
use super::records::{AsnRecord, CityRecord, CountryRecord};
use super::types::IndexMetadata;
use super::DatabaseKind;
use crate::error_handling::{GeoIpError, Result};

/// An opened, queryable database.
///
/// A lookup for an address the database has no data for returns an empty
/// record, not an error. Resources are released on drop.
pub trait LookupIndex: Send + Sync {
    /// Country-level lookup.
    fn country(&self, ip: IpAddr) -> Result<CountryRecord>;

    /// City-level lookup.
    fn city(&self, ip: IpAddr) -> Result<CityRecord>;

    /// Network owner lookup.
    fn asn(&self, ip: IpAddr) -> Result<AsnRecord>;

    /// Metadata of the underlying file.
    fn metadata(&self) -> IndexMetadata;
}

/// Opens installed database files.
pub trait IndexOpener: Send + Sync {
    /// Opens `path` as the index for `kind`.
    ///
    /// Any failure, including an unreadable file, is `GeoIpError::OpenFailed`.
    fn open(&self, kind: DatabaseKind, path: &Path) -> Result<Box<dyn LookupIndex>>;
}

/// `IndexOpener` for MaxMind `.mmdb` files.
#[derive(Debug, Default, Clone, Copy)]
pub struct MmdbOpener;

impl IndexOpener for MmdbOpener {
    fn open(&self, kind: DatabaseKind, path: &Path) -> Result<Box<dyn LookupIndex>> {
        Ok(Box::new(MmdbIndex::open(kind, path)?))
    }
}

/// A `.mmdb` file loaded into memory.
pub struct MmdbIndex {
    kind: DatabaseKind,
    reader: Reader<Vec<u8>>,
    path: PathBuf,
}

impl MmdbIndex {
    /// Reads the whole file and parses its metadata section.
    pub fn open(kind: DatabaseKind, path: &Path) -> Result<Self> {
        let open_failed = |message: String| GeoIpError::OpenFailed {
            kind,
            path: path.to_path_buf(),
            message,
        };

        let db_bytes = std::fs::read(path).map_err(|e| open_failed(e.to_string()))?;
        let reader = Reader::from_source(db_bytes).map_err(|e| open_failed(e.to_string()))?;

        log::debug!(
            "Opened {} ({}, build epoch {})",
            path.display(),
            reader.metadata.database_type,
            reader.metadata.build_epoch
        );

        Ok(MmdbIndex {
            kind,
            reader,
            path: path.to_path_buf(),
        })
    }

    fn decode<T: DeserializeOwned + Default>(&self, ip: IpAddr) -> Result<T> {
        let lookup_failed = |message: String| GeoIpError::Lookup {
            kind: self.kind,
            message,
        };

        let lookup = self
            .reader
            .lookup(ip)
            .map_err(|e| lookup_failed(e.to_string()))?;
        if !lookup.has_data() {
            return Ok(T::default());
        }

        match lookup.decode::<T>() {
            Ok(Some(record)) => Ok(record),
            Ok(None) => Ok(T::default()),
            Err(e) => Err(lookup_failed(e.to_string())),
        }
    }
}

impl LookupIndex for MmdbIndex {
    fn country(&self, ip: IpAddr) -> Result<CountryRecord> {
        self.decode(ip)
    }

    fn city(&self, ip: IpAddr) -> Result<CityRecord> {
        self.decode(ip)
    }

    fn asn(&self, ip: IpAddr) -> Result<AsnRecord> {
        self.decode(ip)
    }

    fn metadata(&self) -> IndexMetadata {
        extract_metadata(&self.reader, &self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_missing_file_is_open_failed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("GeoLite2-City.mmdb");

        let err = MmdbOpener.open(DatabaseKind::City, &path).err().unwrap();
        assert!(
            matches!(err, GeoIpError::OpenFailed { kind: DatabaseKind::City, .. }),
            "{:?}",
            err
        );
    }

    #[test]
    fn test_open_corrupt_file_is_open_failed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("GeoLite2-ASN.mmdb");
        std::fs::write(&path, b"not a valid mmdb file").unwrap();

        let err = MmdbOpener.open(DatabaseKind::Asn, &path).err().unwrap();
        assert!(matches!(err, GeoIpError::OpenFailed { .. }), "{:?}", err);
        assert!(err.to_string().contains("GeoLite2-ASN"), "{}", err);
    }
}
