//! Vendor record shapes.
//!
//! These mirror the GeoIP2 record layout closely enough to be decoded straight
//! out of an `.mmdb` file, while owning their data so a `LookupIndex` can hand
//! them out independently of the reader's buffer. Names are kept per locale;
//! picking the display locale is the lookup service's job.

use std::collections::BTreeMap;

use serde::Deserialize;

/// Localized names keyed by locale code (`en`, `de`, ...).
pub type Names = BTreeMap<String, String>;

/// Continent part of a record.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Continent {
    pub code: Option<String>,
    pub names: Names,
}

/// Country part of a record.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Country {
    pub iso_code: Option<String>,
    pub names: Names,
}

/// Network traits.
///
/// GeoLite2 builds still carry the legacy anonymous-proxy and
/// satellite-provider flags; they are absent for most networks.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Traits {
    pub is_anonymous_proxy: Option<bool>,
    pub is_satellite_provider: Option<bool>,
}

/// City part of a record.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct City {
    pub names: Names,
}

/// Location part of a record.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Location {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub time_zone: Option<String>,
}

/// Record of a Country database.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CountryRecord {
    pub continent: Continent,
    pub country: Country,
    pub traits: Traits,
}

/// Record of a City database.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CityRecord {
    pub city: City,
    pub continent: Continent,
    pub country: Country,
    pub location: Location,
    pub traits: Traits,
}

/// Record of an ASN database.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AsnRecord {
    pub autonomous_system_number: Option<u32>,
    pub autonomous_system_organization: Option<String>,
}
