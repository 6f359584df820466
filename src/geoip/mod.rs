//! GeoIP database lifecycle and lookups using MaxMind GeoLite2 databases.
//!
//! This module downloads the Country, City and ASN databases, verifies and
//! installs them atomically, keeps one open index per kind and answers IP
//! lookups against them while they are refreshed in the background.

mod checksum;
mod download;
mod extract;
mod index;
mod kind;
mod manager;
mod metadata;
pub mod records;
mod registry;
mod scheduler;
mod service;
mod sidecar;
mod types;

// Re-export public API
pub use checksum::{compute_digest, digests_match, verify};
pub use download::Downloader;
pub use extract::extract_member;
pub use index::{IndexOpener, LookupIndex, MmdbIndex, MmdbOpener};
pub use kind::DatabaseKind;
pub use manager::GeoIpManager;
pub use registry::ReaderRegistry;
pub use scheduler::RefreshScheduler;
pub use service::{parse_ip, GeoIpService, GeoLookupError};
pub use sidecar::{derive_member_name, parse_sidecar, read_sidecar, Sidecar};
pub use types::{DownloadReport, GeoIp, IndexMetadata, IpAsn, IpCity, IpCountry};
