//! In-memory snapshot repository for testing and development.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::StoreSnapshot;
use crate::ports::{SnapshotRepository, SnapshotRepositoryError};

/// Holds the shared record in process memory.
#[derive(Clone, Default)]
pub struct InMemorySnapshotRepository {
    record: Arc<RwLock<Option<StoreSnapshot>>>,
}

impl InMemorySnapshotRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a record is currently stored.
    pub async fn is_populated(&self) -> bool {
        self.record.read().await.is_some()
    }
}

#[async_trait]
impl SnapshotRepository for InMemorySnapshotRepository {
    async fn load(&self) -> Result<Option<StoreSnapshot>, SnapshotRepositoryError> {
        Ok(self.record.read().await.clone())
    }

    async fn save(&self, snapshot: &StoreSnapshot) -> Result<(), SnapshotRepositoryError> {
        *self.record.write().await = Some(snapshot.clone());
        Ok(())
    }

    async fn delete(&self) -> Result<(), SnapshotRepositoryError> {
        *self.record.write().await = None;
        Ok(())
    }
}
