//! Download pipeline.
//!
//! One attempt for one kind:
//! 1. fetch the archive and its SHA-256 sidecar into a private temp directory
//! 2. parse the sidecar and verify the archive
//! 3. stream the `.mmdb` member into a temporary file inside the data directory
//! 4. rename that file over the installed database
//!
//! The temp directory and the unpersisted temporary file are removed on every
//! exit path, and the installed file is only ever replaced by rename, so it is
//! either the previous complete version or the new complete version.

use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;
use url::form_urlencoded;

use super::checksum::{compute_digest, digests_match};
use super::extract::extract_member;
use super::sidecar::read_sidecar;
use super::types::DownloadReport;
use super::DatabaseKind;
use crate::config::{Config, ARCHIVE_SUFFIX, CHECKSUM_SUFFIX, MAXMIND_DOWNLOAD_PATH};
use crate::error_handling::{GeoIpError, Result};

/// Fetches, verifies and installs GeoLite2 databases.
pub struct Downloader {
    client: reqwest::Client,
    license_key: String,
    host: String,
    data_dir: PathBuf,
    max_download_size: u64,
}

impl Downloader {
    /// Creates a downloader from the relevant `Config` fields.
    pub fn new(client: reqwest::Client, config: &Config) -> Self {
        Downloader {
            client,
            license_key: config.license_key.clone(),
            host: config.download_host.trim_end_matches('/').to_string(),
            data_dir: config.data_dir.clone(),
            max_download_size: config.max_download_size,
        }
    }

    /// Directory the databases are installed into.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Download URL for `kind` with the given `suffix` query value.
    pub fn download_url(&self, kind: DatabaseKind, suffix: &str) -> String {
        let encoded_key =
            form_urlencoded::byte_serialize(self.license_key.as_bytes()).collect::<String>();
        format!(
            "{}{}?edition_id={}&license_key={}&suffix={}",
            self.host,
            MAXMIND_DOWNLOAD_PATH,
            kind.edition_id(),
            encoded_key,
            suffix
        )
    }

    /// Same as `download_url` but safe to log.
    fn display_url(&self, kind: DatabaseKind, suffix: &str) -> String {
        format!(
            "{}{}?edition_id={}&license_key=***&suffix={}",
            self.host,
            MAXMIND_DOWNLOAD_PATH,
            kind.edition_id(),
            suffix
        )
    }

    /// True when the installed file for `kind` exists and can be stat'ed.
    pub async fn is_installed(&self, kind: DatabaseKind) -> bool {
        let path = kind.installed_path(&self.data_dir);
        match tokio::fs::metadata(&path).await {
            Ok(meta) => meta.is_file(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
            Err(e) => {
                log::warn!("Cannot check DB file {}: {}", path.display(), e);
                false
            }
        }
    }

    /// Kinds with an installed file, in processing order.
    pub async fn installed_kinds(&self) -> Vec<DatabaseKind> {
        let mut installed = Vec::new();
        for kind in DatabaseKind::ALL {
            if self.is_installed(kind).await {
                installed.push(kind);
            }
        }
        installed
    }

    /// Downloads and installs one database.
    ///
    /// Returns the installed path. Nothing is retried here; the scheduler's
    /// next tick is the retry.
    pub async fn download_one(&self, kind: DatabaseKind) -> Result<PathBuf> {
        if self.license_key.is_empty() {
            return Err(GeoIpError::LicenseKeyRequired);
        }

        tokio::fs::create_dir_all(&self.data_dir)
            .await
            .map_err(|e| GeoIpError::io(&self.data_dir, e))?;

        // Removed on drop, whichever step below fails.
        let workspace = tempfile::Builder::new()
            .prefix(&format!("{}-", kind.edition_id()))
            .tempdir()
            .map_err(|e| GeoIpError::io(std::env::temp_dir(), e))?;
        let archive_path = workspace
            .path()
            .join(format!("{}.{}", kind.edition_id(), ARCHIVE_SUFFIX));
        let sidecar_path = workspace
            .path()
            .join(format!("{}.{}", kind.edition_id(), CHECKSUM_SUFFIX));

        log::info!("Downloading DB file, path={}", archive_path.display());
        self.fetch_to_file(kind, ARCHIVE_SUFFIX, &archive_path)
            .await?;

        log::info!("Downloading sha256 file, path={}", sidecar_path.display());
        self.fetch_to_file(kind, CHECKSUM_SUFFIX, &sidecar_path)
            .await?;

        let sidecar = read_sidecar(&sidecar_path).await?;
        let actual = compute_digest(&archive_path).await?;
        if !digests_match(&actual, &sidecar.digest) {
            return Err(GeoIpError::ChecksumMismatch {
                path: archive_path,
                expected: sidecar.digest,
                actual,
            });
        }
        log::info!("Checksum validated, path={}", archive_path.display());

        let final_path = kind.installed_path(&self.data_dir);
        let data_dir = self.data_dir.clone();
        let member_name = sidecar.member_name;
        let install_target = final_path.clone();
        tokio::task::spawn_blocking(move || {
            install_member(&archive_path, &member_name, &data_dir, &install_target)
        })
        .await??;

        log::info!("Installed {} database at {}", kind, final_path.display());
        Ok(final_path)
    }

    /// Downloads every kind, each independently of the others.
    ///
    /// Failed kinds that still have an installed copy are reported in
    /// `DownloadReport::stale`. If a failed kind has never been installed the
    /// cycle fails with `DownloadUnavailable`.
    pub async fn download_all(&self) -> Result<DownloadReport> {
        log::info!("Downloading all DB files");

        let mut report = DownloadReport::default();
        let mut failed = Vec::new();
        for kind in DatabaseKind::ALL {
            match self.download_one(kind).await {
                Ok(_) => report.installed.push(kind),
                Err(e) => {
                    log::error!("Error downloading DB, type={}: {}", kind, e);
                    failed.push((kind, e.to_string()));
                }
            }
        }

        if failed.is_empty() {
            return Ok(report);
        }

        let mut never_installed = Vec::new();
        for (kind, _) in &failed {
            if !self.is_installed(*kind).await {
                never_installed.push(*kind);
            }
        }
        if !never_installed.is_empty() {
            return Err(GeoIpError::DownloadUnavailable(never_installed));
        }

        log::warn!("Continuing with existing DB files despite download errors");
        report.stale = failed;
        Ok(report)
    }

    /// Streams one vendor file to `dest`, enforcing the size cap.
    async fn fetch_to_file(&self, kind: DatabaseKind, suffix: &str, dest: &Path) -> Result<u64> {
        let url = self.download_url(kind, suffix);
        let too_large = || GeoIpError::DownloadTooLarge {
            url: self.display_url(kind, suffix),
            limit: self.max_download_size,
        };

        // The license key is part of the URL; keep it out of error messages.
        let mut response = self
            .client
            .get(&url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| GeoIpError::Transport(e.without_url()))?;

        if let Some(content_length) = response.content_length() {
            if content_length > self.max_download_size {
                return Err(too_large());
            }
        }

        let mut file = tokio::fs::File::create(dest)
            .await
            .map_err(|e| GeoIpError::io(dest, e))?;
        let mut written: u64 = 0;
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| GeoIpError::Transport(e.without_url()))?
        {
            written += chunk.len() as u64;
            if written > self.max_download_size {
                return Err(too_large());
            }
            file.write_all(&chunk)
                .await
                .map_err(|e| GeoIpError::io(dest, e))?;
        }
        file.flush().await.map_err(|e| GeoIpError::io(dest, e))?;

        log::debug!(
            "Fetched {} ({} bytes)",
            self.display_url(kind, suffix),
            written
        );
        Ok(written)
    }
}

/// Extracts `member_name` next to `final_path` and renames it into place.
///
/// The temporary file lives in `data_dir` so the rename never crosses a
/// filesystem boundary; it is deleted if anything fails before the rename.
fn install_member(archive: &Path, member_name: &str, data_dir: &Path, final_path: &Path) -> Result<()> {
    let file_name = final_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut tmp = tempfile::Builder::new()
        .prefix(&format!("{}.", file_name))
        .suffix(".tmp")
        .tempfile_in(data_dir)
        .map_err(|e| GeoIpError::io(data_dir, e))?;

    extract_member(archive, member_name, tmp.as_file_mut())?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| GeoIpError::io(tmp.path(), e))?;

    tmp.persist(final_path)
        .map_err(|e| GeoIpError::io(final_path, e.error))?;
    Ok(())
}
