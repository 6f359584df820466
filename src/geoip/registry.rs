//! Registry of opened lookup indexes.
//!
//! Each kind maps to at most one open index. Reloads open the new index
//! outside the lock, swap it in under the exclusive lock and drop the old one
//! after the lock is released, so lookups only ever wait for the swap itself.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::{RwLock, RwLockReadGuard};

use super::index::{IndexOpener, LookupIndex, MmdbOpener};
use super::types::IndexMetadata;
use super::DatabaseKind;
use crate::error_handling::{GeoIpError, Result};

type IndexMap = HashMap<DatabaseKind, Box<dyn LookupIndex>>;

/// Shared, explicitly constructed holder of the open indexes.
pub struct ReaderRegistry {
    data_dir: PathBuf,
    opener: Arc<dyn IndexOpener>,
    indexes: RwLock<IndexMap>,
}

impl ReaderRegistry {
    /// Creates an empty registry reading from `data_dir` through `opener`.
    pub fn new(data_dir: impl Into<PathBuf>, opener: Arc<dyn IndexOpener>) -> Self {
        ReaderRegistry {
            data_dir: data_dir.into(),
            opener,
            indexes: RwLock::new(HashMap::new()),
        }
    }

    /// Creates an empty registry backed by `.mmdb` files.
    pub fn with_mmdb(data_dir: impl Into<PathBuf>) -> Self {
        Self::new(data_dir, Arc::new(MmdbOpener))
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Opens every installed database and swaps it in.
    ///
    /// Kinds are processed in order Country, City, Asn. A kind without an
    /// installed file is skipped with a warning and keeps whatever it had; a
    /// file whose presence cannot be checked counts as an open failure.
    /// The first open failure aborts the reload: kinds already swapped keep
    /// their new index, later kinds keep their previous one.
    pub async fn load_all(&self) -> Result<()> {
        for kind in DatabaseKind::ALL {
            let path = kind.installed_path(&self.data_dir);
            match tokio::fs::try_exists(&path).await {
                Ok(true) => {}
                Ok(false) => {
                    log::warn!("DB file not found, type={} path={}", kind, path.display());
                    continue;
                }
                Err(e) => {
                    return Err(GeoIpError::OpenFailed {
                        kind,
                        path,
                        message: e.to_string(),
                    })
                }
            }

            let opener = Arc::clone(&self.opener);
            let open_path = path.clone();
            let index = tokio::task::spawn_blocking(move || opener.open(kind, &open_path))
                .await??;

            let previous = {
                let mut indexes = self.indexes.write().await;
                indexes.insert(kind, index)
            };
            // Closed here, after the write lock is gone.
            drop(previous);

            log::info!("Loaded DB, type={} path={}", kind, path.display());
        }
        Ok(())
    }

    /// Returns the index for `kind` behind a shared read guard.
    ///
    /// A reload of this kind waits until the guard is dropped.
    pub async fn get(
        &self,
        kind: DatabaseKind,
    ) -> Result<RwLockReadGuard<'_, dyn LookupIndex>> {
        let guard = self.indexes.read().await;
        RwLockReadGuard::try_map(guard, |indexes| indexes.get(&kind).map(|index| &**index))
            .map_err(|_| GeoIpError::NotLoaded(kind))
    }

    /// Releases every open index. The registry stays usable.
    pub async fn close_all(&self) {
        let closed = {
            let mut indexes = self.indexes.write().await;
            std::mem::take(&mut *indexes)
        };
        if !closed.is_empty() {
            log::info!("Closing {} DB reader(s)", closed.len());
        }
        drop(closed);
    }

    pub async fn is_loaded(&self, kind: DatabaseKind) -> bool {
        self.indexes.read().await.contains_key(&kind)
    }

    /// Loaded kinds in processing order.
    pub async fn loaded_kinds(&self) -> Vec<DatabaseKind> {
        let indexes = self.indexes.read().await;
        DatabaseKind::ALL
            .into_iter()
            .filter(|kind| indexes.contains_key(kind))
            .collect()
    }

    /// Metadata of the loaded index for `kind`.
    pub async fn metadata(&self, kind: DatabaseKind) -> Result<IndexMetadata> {
        Ok(self.get(kind).await?.metadata())
    }
}
