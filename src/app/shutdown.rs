//! Graceful shutdown handling.

use tokio_util::sync::CancellationToken;

use crate::geoip::ReaderRegistry;

/// Shuts down the background refresh and releases the open databases.
///
/// A refresh tick that is already running finishes before the scheduler
/// task returns.
pub async fn shutdown_gracefully(
    cancel: CancellationToken,
    scheduler_task: Option<tokio::task::JoinHandle<()>>,
    registry: &ReaderRegistry,
) {
    cancel.cancel();
    if let Some(scheduler_task) = scheduler_task {
        if let Err(e) = scheduler_task.await {
            log::error!("DB refresh task failed: {}", e);
        }
    }

    registry.close_all().await;
}
