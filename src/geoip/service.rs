//! IP lookup API.
//!
//! Validates the textual address, fetches the index for the kind from the
//! registry and maps the vendor record onto the domain records. Display names
//! use the `en` locale.

use std::net::IpAddr;
use std::sync::Arc;

use thiserror::Error;

use super::records::{Continent, Country, Names, Traits};
use super::registry::ReaderRegistry;
use super::types::{GeoIp, IpAsn, IpCity, IpCountry};
use super::DatabaseKind;
use crate::config::DISPLAY_LOCALE;
use crate::error_handling::{GeoIpError, Result};

/// A failed combined lookup.
///
/// `record` only echoes the requested IP; `source` is the first failure.
#[derive(Error, Debug)]
#[error("geo lookup for {} failed: {source}", .record.ip)]
pub struct GeoLookupError {
    pub record: GeoIp,
    #[source]
    pub source: GeoIpError,
}

/// Parses an IPv4 or IPv6 address.
pub fn parse_ip(ip: &str) -> Result<IpAddr> {
    ip.parse::<IpAddr>()
        .map_err(|_| GeoIpError::InvalidIp(ip.to_string()))
}

fn display_name(names: &Names) -> Option<String> {
    names.get(DISPLAY_LOCALE).cloned()
}

fn country_fields(ip: &str, continent: &Continent, country: &Country, traits: &Traits) -> IpCountry {
    IpCountry {
        ip: ip.to_string(),
        country: display_name(&country.names),
        continent: display_name(&continent.names),
        iso_country_code: country.iso_code.clone(),
        iso_continent_code: continent.code.clone(),
        is_anonymous_proxy: traits.is_anonymous_proxy.unwrap_or(false),
        is_satellite_provider: traits.is_satellite_provider.unwrap_or(false),
    }
}

/// Lookup operations over a shared registry.
#[derive(Clone)]
pub struct GeoIpService {
    registry: Arc<ReaderRegistry>,
}

impl GeoIpService {
    pub fn new(registry: Arc<ReaderRegistry>) -> Self {
        GeoIpService { registry }
    }

    /// Country-level lookup against the Country database.
    pub async fn ip2_country(&self, ip: &str) -> Result<IpCountry> {
        let addr = parse_ip(ip)?;
        let index = self.registry.get(DatabaseKind::Country).await?;
        let record = index.country(addr)?;
        Ok(country_fields(
            ip,
            &record.continent,
            &record.country,
            &record.traits,
        ))
    }

    /// City-level lookup against the City database.
    pub async fn ip2_city(&self, ip: &str) -> Result<IpCity> {
        let addr = parse_ip(ip)?;
        let index = self.registry.get(DatabaseKind::City).await?;
        let record = index.city(addr)?;
        Ok(IpCity {
            city: display_name(&record.city.names),
            country: country_fields(ip, &record.continent, &record.country, &record.traits),
            timezone: record.location.time_zone,
            latitude: record.location.latitude,
            longitude: record.location.longitude,
        })
    }

    /// Network owner lookup against the ASN database.
    pub async fn ip2_asn(&self, ip: &str) -> Result<IpAsn> {
        let addr = parse_ip(ip)?;
        let index = self.registry.get(DatabaseKind::Asn).await?;
        let record = index.asn(addr)?;
        Ok(IpAsn {
            ip: ip.to_string(),
            asn: record.autonomous_system_number,
            organization: record.autonomous_system_organization,
        })
    }

    /// City lookup followed by ASN lookup.
    ///
    /// Stops at the first failure; the ASN lookup does not run if the City
    /// lookup failed.
    pub async fn ip2_geo(&self, ip: &str) -> std::result::Result<GeoIp, GeoLookupError> {
        let fail = |source| GeoLookupError {
            record: GeoIp::echo(ip),
            source,
        };

        let city = self.ip2_city(ip).await.map_err(fail)?;
        let asn = self.ip2_asn(ip).await.map_err(fail)?;

        Ok(GeoIp {
            ip: ip.to_string(),
            city: Some(city),
            asn: Some(asn),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ip() {
        assert!(parse_ip("81.2.69.160").is_ok());
        assert!(parse_ip("2001:db8::1").is_ok());
        for bad in ["", "81.2.69.", "999.1.1.1", "not an ip", " 81.2.69.160"] {
            assert!(
                matches!(parse_ip(bad), Err(GeoIpError::InvalidIp(ref s)) if s == bad),
                "{:?} should be invalid",
                bad
            );
        }
    }

    #[test]
    fn test_missing_traits_read_as_false() {
        let fields = country_fields(
            "1.1.1.1",
            &Continent::default(),
            &Country::default(),
            &Traits::default(),
        );
        assert!(!fields.is_anonymous_proxy);
        assert!(!fields.is_satellite_provider);
        assert_eq!(fields.country, None);
    }

    #[test]
    fn test_display_name_uses_english() {
        let mut names = Names::new();
        names.insert("de".into(), "Vereinigtes Königreich".into());
        assert_eq!(display_name(&names), None);
        names.insert("en".into(), "United Kingdom".into());
        assert_eq!(display_name(&names).as_deref(), Some("United Kingdom"));
    }

    #[tokio::test]
    async fn test_invalid_ip_before_registry() {
        let dir = tempfile::TempDir::new().unwrap();
        let service = GeoIpService::new(Arc::new(ReaderRegistry::with_mmdb(dir.path())));

        assert!(matches!(
            service.ip2_asn("81.2.69.").await,
            Err(GeoIpError::InvalidIp(_))
        ));
        let err = service.ip2_geo("").await.unwrap_err();
        assert_eq!(err.record, GeoIp::echo(""));
        assert!(matches!(err.source, GeoIpError::InvalidIp(_)));
    }
}
