//! In-memory remote store for testing.
//!
//! Records every upload and can be told to fail, so sync behavior under an
//! unreachable remote can be asserted without a network.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{StoreSnapshot, Timestamp};
use crate::ports::{RemoteStore, RemoteStoreError, SaveReceipt};

/// Shared in-memory stand-in for the remote record.
///
/// # Example
///
/// ```ignore
/// let remote = InMemoryRemoteStore::new();
/// remote.set_failing(true);
///
/// coordinator.push_now().await.unwrap_err();
/// assert_eq!(remote.save_count(), 0);
/// ```
#[derive(Clone, Default)]
pub struct InMemoryRemoteStore {
    record: Arc<RwLock<Option<StoreSnapshot>>>,
    failing: Arc<AtomicBool>,
    saves: Arc<AtomicUsize>,
}

impl InMemoryRemoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with `snapshot` as the remote record.
    pub fn with_snapshot(snapshot: StoreSnapshot) -> Self {
        Self {
            record: Arc::new(RwLock::new(Some(snapshot))),
            ..Self::default()
        }
    }

    /// Makes every call fail with `Unreachable` until reset.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    // === Test Helpers ===

    /// Current remote record.
    pub async fn snapshot(&self) -> Option<StoreSnapshot> {
        self.record.read().await.clone()
    }

    /// Number of successful uploads.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    fn check_reachable(&self) -> Result<(), RemoteStoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(RemoteStoreError::Unreachable(
                "remote store offline".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for InMemoryRemoteStore {
    async fn load(&self) -> Result<Option<StoreSnapshot>, RemoteStoreError> {
        self.check_reachable()?;
        Ok(self.record.read().await.clone())
    }

    async fn save(&self, snapshot: &StoreSnapshot) -> Result<SaveReceipt, RemoteStoreError> {
        self.check_reachable()?;
        *self.record.write().await = Some(snapshot.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(SaveReceipt {
            success: true,
            timestamp: Some(Timestamp::now().to_rfc3339()),
        })
    }

    async fn clear(&self) -> Result<(), RemoteStoreError> {
        self.check_reachable()?;
        *self.record.write().await = None;
        Ok(())
    }
}
