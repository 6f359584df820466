//! Wiring of the download pipeline, registry, scheduler and lookup service.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::download::Downloader;
use super::index::IndexOpener;
use super::registry::ReaderRegistry;
use super::scheduler::RefreshScheduler;
use super::service::GeoIpService;
use super::types::DownloadReport;
use crate::config::Config;
use crate::error_handling::Result;

/// Owns one set of collaborators built from a `Config`.
pub struct GeoIpManager {
    config: Config,
    downloader: Arc<Downloader>,
    registry: Arc<ReaderRegistry>,
    service: GeoIpService,
}

impl GeoIpManager {
    /// Builds a manager reading `.mmdb` files.
    pub fn new(client: reqwest::Client, config: Config) -> Self {
        let registry = Arc::new(ReaderRegistry::with_mmdb(config.data_dir.clone()));
        Self::with_registry(client, config, registry)
    }

    /// Builds a manager whose registry opens files through `opener`.
    pub fn with_opener(client: reqwest::Client, config: Config, opener: Arc<dyn IndexOpener>) -> Self {
        let registry = Arc::new(ReaderRegistry::new(config.data_dir.clone(), opener));
        Self::with_registry(client, config, registry)
    }

    fn with_registry(client: reqwest::Client, config: Config, registry: Arc<ReaderRegistry>) -> Self {
        let downloader = Arc::new(Downloader::new(client, &config));
        let service = GeoIpService::new(Arc::clone(&registry));
        GeoIpManager {
            config,
            downloader,
            registry,
            service,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn downloader(&self) -> &Arc<Downloader> {
        &self.downloader
    }

    pub fn registry(&self) -> &Arc<ReaderRegistry> {
        &self.registry
    }

    pub fn service(&self) -> &GeoIpService {
        &self.service
    }

    /// Opens whatever is installed.
    pub async fn load(&self) -> Result<()> {
        self.registry.load_all().await
    }

    /// Manual sync: one download cycle followed by a reload.
    ///
    /// A failed cycle is returned without reloading.
    pub async fn sync(&self) -> Result<DownloadReport> {
        let report = self.downloader.download_all().await?;
        self.registry.load_all().await?;
        Ok(report)
    }

    /// Starts the refresh scheduler when auto update is enabled.
    pub fn start_auto_update(&self, cancel: CancellationToken) -> Option<JoinHandle<()>> {
        if !self.config.auto_update {
            log::info!("Auto-update disabled");
            return None;
        }
        let scheduler = Arc::new(RefreshScheduler::new(
            Arc::clone(&self.downloader),
            Arc::clone(&self.registry),
        ));
        Some(scheduler.spawn(self.config.update_interval, cancel))
    }

    /// Releases every open index.
    pub async fn close(&self) {
        self.registry.close_all().await;
    }
}
