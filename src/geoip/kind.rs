//! Database kinds.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use strum_macros::EnumIter;

use crate::config::DB_SUFFIX;

/// The three independent GeoLite2 databases.
///
/// Declaration order is the processing order of downloads and reloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, Serialize)]
pub enum DatabaseKind {
    /// GeoLite2-Country
    Country,
    /// GeoLite2-City
    City,
    /// GeoLite2-ASN
    Asn,
}

impl DatabaseKind {
    /// All kinds in processing order.
    pub const ALL: [DatabaseKind; 3] = [DatabaseKind::Country, DatabaseKind::City, DatabaseKind::Asn];

    /// MaxMind edition id, used in download URLs and installed file names.
    pub fn edition_id(&self) -> &'static str {
        match self {
            DatabaseKind::Country => "GeoLite2-Country",
            DatabaseKind::City => "GeoLite2-City",
            DatabaseKind::Asn => "GeoLite2-ASN",
        }
    }

    /// Human label used in messages ("country database not loaded").
    pub fn label(&self) -> &'static str {
        match self {
            DatabaseKind::Country => "country",
            DatabaseKind::City => "city",
            DatabaseKind::Asn => "ASN",
        }
    }

    /// Installed file name, e.g. `GeoLite2-City.mmdb`.
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.edition_id(), DB_SUFFIX)
    }

    /// Installed file path inside `data_dir`.
    pub fn installed_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(self.file_name())
    }
}

impl fmt::Display for DatabaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.edition_id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_all_matches_declaration_order() {
        let iterated: Vec<_> = DatabaseKind::iter().collect();
        assert_eq!(iterated, DatabaseKind::ALL.to_vec());
    }

    #[test]
    fn test_installed_path() {
        let path = DatabaseKind::Asn.installed_path(Path::new("/data"));
        assert_eq!(path, PathBuf::from("/data/GeoLite2-ASN.mmdb"));
    }
}
