//! Periodic database refresh.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::download::Downloader;
use super::registry::ReaderRegistry;

/// Re-downloads and reloads the databases on a fixed interval.
pub struct RefreshScheduler {
    downloader: Arc<Downloader>,
    registry: Arc<ReaderRegistry>,
}

impl RefreshScheduler {
    pub fn new(downloader: Arc<Downloader>, registry: Arc<ReaderRegistry>) -> Self {
        RefreshScheduler {
            downloader,
            registry,
        }
    }

    /// One refresh tick.
    ///
    /// Downloads everything, then reloads whatever is installed even if the
    /// download cycle failed. Failures are logged, never returned.
    pub async fn refresh_once(&self) {
        match self.downloader.download_all().await {
            Ok(report) if report.is_partial() => {
                log::warn!(
                    "Partial DB update: {} updated, {} kept from previous cycle",
                    report.installed.len(),
                    report.stale.len()
                );
            }
            Ok(_) => log::info!("All DB files updated"),
            Err(e) => log::error!("Error updating DB files: {}", e),
        }

        if self.downloader.installed_kinds().await.is_empty() {
            log::warn!("No DB files installed, skipping reload");
            return;
        }
        if let Err(e) = self.registry.load_all().await {
            log::error!("Error reloading DB readers: {}", e);
        }
    }

    /// Runs refresh ticks until `cancel` fires.
    ///
    /// The first tick happens one `interval` after the call. Cancellation is
    /// observed between ticks; a tick in progress runs to completion.
    pub async fn run(&self, interval: Duration, cancel: CancellationToken) {
        if interval.is_zero() {
            log::error!("Auto-update interval must be positive, scheduler not started");
            return;
        }

        log::info!("Auto-update every {:?}", interval);
        let mut ticker = interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    log::debug!("DB refresh scheduler shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    log::info!("Running scheduled DB update");
                    self.refresh_once().await;
                }
            }
        }
    }

    /// Spawns `run` on the runtime; await the handle after cancelling.
    pub fn spawn(
        self: Arc<Self>,
        interval: Duration,
        cancel: CancellationToken,
    ) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move { self.run(interval, cancel).await })
    }
}
