//! GeoIP data structures.
//!
//! This module defines the domain records returned by lookups, the report of a
//! download cycle and metadata about opened databases.

use std::path::PathBuf;

use serde::Serialize;

use super::DatabaseKind;

/// Country information for an IP.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IpCountry {
    pub ip: String,
    pub country: Option<String>,
    pub continent: Option<String>,
    pub iso_country_code: Option<String>,
    pub iso_continent_code: Option<String>,
    pub is_anonymous_proxy: bool,
    pub is_satellite_provider: bool,
}

/// City information for an IP, including the country fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IpCity {
    pub city: Option<String>,
    #[serde(flatten)]
    pub country: IpCountry,
    pub timezone: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Network owner of an IP.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IpAsn {
    pub ip: String,
    pub asn: Option<u32>,
    pub organization: Option<String>,
}

/// Combined City + ASN record.
///
/// The parts are `None` when the corresponding sub-lookup did not run or
/// failed, so a failed lookup still echoes the requested IP.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GeoIp {
    pub ip: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<IpCity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asn: Option<IpAsn>,
}

impl GeoIp {
    /// Record that only carries the requested IP.
    pub fn echo(ip: &str) -> Self {
        GeoIp {
            ip: ip.to_string(),
            ..Default::default()
        }
    }
}

/// Metadata about an opened database.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexMetadata {
    /// Database type reported by the file, e.g. `GeoLite2-City`
    pub database_type: String,
    /// Build time as seconds since the Unix epoch
    pub build_epoch: u64,
    /// 4 or 6
    pub ip_version: u16,
    /// File the index was opened from
    pub path: PathBuf,
}

impl IndexMetadata {
    /// Build date in RFC 3339, or the raw epoch if it is out of range.
    pub fn build_date(&self) -> String {
        i64::try_from(self.build_epoch)
            .ok()
            .and_then(|secs| chrono::DateTime::from_timestamp(secs, 0))
            .map(|dt| dt.to_rfc3339())
            .unwrap_or_else(|| format!("epoch {}", self.build_epoch))
    }
}

/// Outcome of a download cycle that still leaves every kind servable.
#[derive(Debug, Default)]
pub struct DownloadReport {
    /// Kinds freshly installed in this cycle
    pub installed: Vec<DatabaseKind>,
    /// Kinds that failed and are served from their previous copy
    pub stale: Vec<(DatabaseKind, String)>,
}

impl DownloadReport {
    /// True when some kind fell back to stale data.
    pub fn is_partial(&self) -> bool {
        !self.stale.is_empty()
    }
}
