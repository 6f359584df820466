// Shared test helpers: a fake lookup index and vendor archive fixtures.
//
// The fake opener accepts files whose content is a decimal number (used as the
// build epoch so tests can tell index generations apart) and rejects anything
// else with `OpenFailed`.
#![allow(dead_code)]

use std::collections::BTreeMap;
use std::io::Write;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use flate2::write::GzEncoder;
use flate2::Compression;
use geoip_service::error_handling::Result;
use geoip_service::geoip::records::{
    AsnRecord, City, CityRecord, Continent, Country, CountryRecord, Location,
};
use geoip_service::geoip::{IndexMetadata, IndexOpener, LookupIndex};
use geoip_service::{DatabaseKind, GeoIpError};
use httptest::{matchers::*, responders::*, Expectation, Server};
use sha2::{Digest, Sha256};

pub const LONDON_IP: &str = "81.2.69.160";
pub const CELLCO_IP: &str = "149.101.100.0";
pub const RELEASE_DATE: &str = "20240604";

fn en(name: &str) -> BTreeMap<String, String> {
    BTreeMap::from([("en".to_string(), name.to_string())])
}

fn london_country() -> (Continent, Country) {
    (
        Continent {
            code: Some("EU".into()),
            names: en("Europe"),
        },
        Country {
            iso_code: Some("GB".into()),
            names: en("United Kingdom"),
        },
    )
}

/// Counters shared by every index a `FakeOpener` hands out.
#[derive(Default, Clone)]
pub struct Counters {
    pub opened: Arc<AtomicUsize>,
    pub dropped: Arc<AtomicUsize>,
    pub lookups: Arc<AtomicUsize>,
}

impl Counters {
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn dropped(&self) -> usize {
        self.dropped.load(Ordering::SeqCst)
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

pub struct FakeIndex {
    kind: DatabaseKind,
    generation: u64,
    path: PathBuf,
    counters: Counters,
}

impl Drop for FakeIndex {
    fn drop(&mut self) {
        self.counters.dropped.fetch_add(1, Ordering::SeqCst);
    }
}

impl LookupIndex for FakeIndex {
    fn country(&self, ip: IpAddr) -> Result<CountryRecord> {
        self.counters.lookups.fetch_add(1, Ordering::SeqCst);
        if ip.to_string() != LONDON_IP {
            return Ok(CountryRecord::default());
        }
        let (continent, country) = london_country();
        Ok(CountryRecord {
            continent,
            country,
            ..Default::default()
        })
    }

    fn city(&self, ip: IpAddr) -> Result<CityRecord> {
        self.counters.lookups.fetch_add(1, Ordering::SeqCst);
        if ip.to_string() != LONDON_IP {
            return Ok(CityRecord::default());
        }
        let (continent, country) = london_country();
        Ok(CityRecord {
            city: City {
                names: en("London"),
            },
            continent,
            country,
            location: Location {
                latitude: Some(51.5142),
                longitude: Some(-0.0931),
                time_zone: Some("Europe/London".into()),
            },
            ..Default::default()
        })
    }

    fn asn(&self, ip: IpAddr) -> Result<AsnRecord> {
        self.counters.lookups.fetch_add(1, Ordering::SeqCst);
        if ip.to_string() != CELLCO_IP {
            return Ok(AsnRecord::default());
        }
        Ok(AsnRecord {
            autonomous_system_number: Some(6167),
            autonomous_system_organization: Some("CELLCO-PART".into()),
        })
    }

    fn metadata(&self) -> IndexMetadata {
        IndexMetadata {
            database_type: self.kind.edition_id().to_string(),
            build_epoch: self.generation,
            ip_version: 6,
            path: self.path.clone(),
        }
    }
}

#[derive(Default, Clone)]
pub struct FakeOpener {
    pub counters: Counters,
}

impl IndexOpener for FakeOpener {
    fn open(&self, kind: DatabaseKind, path: &Path) -> Result<Box<dyn LookupIndex>> {
        let open_failed = |message: String| GeoIpError::OpenFailed {
            kind,
            path: path.to_path_buf(),
            message,
        };
        let content = std::fs::read_to_string(path).map_err(|e| open_failed(e.to_string()))?;
        let generation = content
            .trim()
            .parse::<u64>()
            .map_err(|e| open_failed(e.to_string()))?;

        self.counters.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeIndex {
            kind,
            generation,
            path: path.to_path_buf(),
            counters: self.counters.clone(),
        }))
    }
}

/// Writes an installed database file with the given content.
pub fn install(data_dir: &Path, kind: DatabaseKind, content: &str) {
    std::fs::create_dir_all(data_dir).unwrap();
    std::fs::write(kind.installed_path(data_dir), content).unwrap();
}

/// Builds a vendor archive holding `member` under a dated directory.
pub fn build_archive(kind: DatabaseKind, member: &str, content: &[u8]) -> Vec<u8> {
    let mut tar_builder = tar::Builder::new(Vec::new());
    let mut header = tar::Header::new_gnu();
    header
        .set_path(format!("{}_{}/{}", kind.edition_id(), RELEASE_DATE, member))
        .unwrap();
    header.set_size(content.len() as u64);
    header.set_mode(0o644);
    header.set_cksum();
    tar_builder.append(&header, content).unwrap();

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&tar_builder.into_inner().unwrap()).unwrap();
    encoder.finish().unwrap()
}

/// Sidecar content announcing `digest` for the vendor archive of `kind`.
pub fn sidecar(kind: DatabaseKind, digest: &str) -> String {
    format!("{}  {}_{}.tar.gz\n", digest, kind.edition_id(), RELEASE_DATE)
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

fn vendor_request(kind: DatabaseKind, suffix: &'static str, license_key: &'static str) -> Expectation {
    Expectation::matching(all_of![
        request::method_path("GET", "/app/geoip_download"),
        request::query(url_decoded(contains(("edition_id", kind.edition_id())))),
        request::query(url_decoded(contains(("license_key", license_key)))),
        request::query(url_decoded(contains(("suffix", suffix)))),
    ])
    .times(..)
    .respond_with(status_code(500))
}

/// Serves a valid archive and sidecar for `kind` whose member holds `content`.
pub fn serve_database(server: &Server, kind: DatabaseKind, license_key: &'static str, content: &str) {
    let archive = build_archive(kind, &kind.file_name(), content.as_bytes());
    let digest = sha256_hex(&archive);
    serve_raw(server, kind, license_key, archive, sidecar(kind, &digest));
}

/// Serves arbitrary archive and sidecar bytes for `kind`.
pub fn serve_raw(
    server: &Server,
    kind: DatabaseKind,
    license_key: &'static str,
    archive: Vec<u8>,
    sidecar: String,
) {
    server.expect(
        Expectation::matching(all_of![
            request::method_path("GET", "/app/geoip_download"),
            request::query(url_decoded(contains(("edition_id", kind.edition_id())))),
            request::query(url_decoded(contains(("license_key", license_key)))),
            request::query(url_decoded(contains(("suffix", "tar.gz")))),
        ])
        .times(..)
        .respond_with(status_code(200).body(archive)),
    );
    server.expect(
        Expectation::matching(all_of![
            request::method_path("GET", "/app/geoip_download"),
            request::query(url_decoded(contains(("edition_id", kind.edition_id())))),
            request::query(url_decoded(contains(("license_key", license_key)))),
            request::query(url_decoded(contains(("suffix", "tar.gz.sha256")))),
        ])
        .times(..)
        .respond_with(status_code(200).body(sidecar)),
    );
}

/// Answers every request for `kind` with a server error.
pub fn serve_failure(server: &Server, kind: DatabaseKind, license_key: &'static str) {
    server.expect(vendor_request(kind, "tar.gz", license_key));
    server.expect(vendor_request(kind, "tar.gz.sha256", license_key));
}

/// Names of the entries in `dir`, sorted.
pub fn dir_entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
