//! Adapter wiring from [`AppConfig`](crate::config::AppConfig) sections.
//!
//! The binary uses [`store_state`] to back the `/store` proxy. Embedders use
//! [`Desk::open`] to get a file-backed workspace with optional remote sync.

use std::sync::Arc;

use thiserror::Error;

use crate::adapters::http::store::StoreAppState;
use crate::adapters::remote::{HttpRemoteStore, HttpRemoteStoreConfig};
use crate::adapters::snapshot::RedisSnapshotRepository;
use crate::adapters::storage::FileSlotStore;
use crate::application::{SlotService, SyncConfig, SyncCoordinator, SyncHandle, Workspace};
use crate::config::{RedisConfig, RemoteSyncConfig, StorageConfig};
use crate::ports::{RemoteStoreError, SlotStoreError, SnapshotRepository, SnapshotRepositoryError};

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Slot storage: {0}")]
    Storage(#[from] SlotStoreError),

    #[error("Remote store: {0}")]
    Remote(#[from] RemoteStoreError),

    #[error("Snapshot backend: {0}")]
    Snapshot(#[from] SnapshotRepositoryError),

    #[error("Timed out connecting to {0}")]
    ConnectTimeout(&'static str),
}

/// A workspace over local slot storage, plus the sync coordinator when a
/// remote endpoint is configured.
pub struct Desk {
    pub slots: Arc<SlotService>,
    pub workspace: Workspace,
    pub sync: Option<Arc<SyncCoordinator>>,
}

impl Desk {
    pub fn open(storage: &StorageConfig, sync: &RemoteSyncConfig) -> Result<Self, RuntimeError> {
        let store = FileSlotStore::open(storage.slots_path())?;
        let slots = Arc::new(SlotService::new(Arc::new(store), storage.namespace.clone()));
        let workspace = Workspace::open(slots.clone(), storage.default_workspace.clone());

        let sync = match sync.endpoint() {
            Some(endpoint) => {
                let remote = HttpRemoteStore::new(
                    HttpRemoteStoreConfig::new(endpoint).with_timeout(sync.timeout()),
                )?;
                let config = SyncConfig::default().with_debounce(sync.debounce());
                tracing::info!(endpoint, debounce_ms = sync.debounce_ms, "Remote sync enabled");
                Some(Arc::new(SyncCoordinator::with_config(
                    slots.clone(),
                    Arc::new(remote),
                    config,
                )))
            }
            None => {
                tracing::debug!("No sync endpoint configured, running local-only");
                None
            }
        };

        Ok(Self {
            slots,
            workspace,
            sync,
        })
    }

    /// Pulls the remote snapshot once, then starts the debounced uploader.
    ///
    /// Returns `None` when running local-only.
    pub async fn start_sync(&self) -> Option<SyncHandle> {
        let sync = self.sync.as_ref()?;
        let applied = sync.initial_load().await;
        tracing::info!(applied, "Initial remote load finished");
        Some(sync.start())
    }
}

/// Builds the `/store` state from the Redis section.
///
/// A missing URL is not an error: the endpoint starts and reports the
/// missing configuration on every request.
pub async fn store_state(redis: &RedisConfig) -> Result<StoreAppState, RuntimeError> {
    let Some(url) = redis.url() else {
        tracing::warn!("REVENUE_DESK__REDIS__URL is not set, /api/store will answer 500");
        return Ok(StoreAppState::unconfigured());
    };

    let repository = tokio::time::timeout(redis.timeout(), RedisSnapshotRepository::connect(url))
        .await
        .map_err(|_| RuntimeError::ConnectTimeout("redis"))??;
    tracing::info!("Connected to Redis snapshot store");

    let repository: Arc<dyn SnapshotRepository> = Arc::new(repository);
    Ok(StoreAppState::new(Some(repository)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::metrics::PlanKind;

    fn storage_in(dir: &tempfile::TempDir) -> StorageConfig {
        StorageConfig {
            data_dir: dir.path().to_path_buf(),
            ..Default::default()
        }
    }

    #[test]
    fn desk_is_local_only_without_endpoint() {
        let dir = tempfile::tempdir().unwrap();
        let desk = Desk::open(&storage_in(&dir), &RemoteSyncConfig::default()).unwrap();

        assert!(desk.sync.is_none());
        assert_eq!(desk.workspace.name(), "main");
    }

    #[test]
    fn desk_persists_to_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage_in(&dir);
        {
            let desk = Desk::open(&storage, &RemoteSyncConfig::default()).unwrap();
            desk.workspace.set_year(2031).unwrap();
        }

        assert!(storage.slots_path().exists());
        let desk = Desk::open(&storage, &RemoteSyncConfig::default()).unwrap();
        assert_eq!(desk.workspace.year(), 2031);
        assert!(!desk.workspace.worksheet(PlanKind::Forecast).is_locked());
    }

    #[test]
    fn desk_builds_coordinator_for_endpoint() {
        let dir = tempfile::tempdir().unwrap();
        let sync = RemoteSyncConfig {
            endpoint: Some("http://127.0.0.1:9/api/store".to_string()),
            ..Default::default()
        };
        let desk = Desk::open(&storage_in(&dir), &sync).unwrap();
        assert!(desk.sync.is_some());
    }

    #[tokio::test]
    async fn local_only_desk_has_no_sync_handle() {
        let dir = tempfile::tempdir().unwrap();
        let desk = Desk::open(&storage_in(&dir), &RemoteSyncConfig::default()).unwrap();
        assert!(desk.start_sync().await.is_none());
    }

    #[tokio::test]
    async fn store_state_without_url_is_unconfigured() {
        let state = store_state(&RedisConfig::default()).await.unwrap();
        assert!(!state.is_configured());
    }
}
