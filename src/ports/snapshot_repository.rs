//! Snapshot Repository Port - the single shared record behind `/store`.

use async_trait::async_trait;

use crate::domain::foundation::StoreSnapshot;

/// Errors from the snapshot backend
#[derive(Debug, thiserror::Error)]
pub enum SnapshotRepositoryError {
    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Stored record is corrupt: {0}")]
    Corrupt(String),
}

/// Port for reading and replacing the shared snapshot record
#[async_trait]
pub trait SnapshotRepository: Send + Sync {
    /// Current record, `None` when nothing is stored
    async fn load(&self) -> Result<Option<StoreSnapshot>, SnapshotRepositoryError>;

    /// Replace the record
    async fn save(&self, snapshot: &StoreSnapshot) -> Result<(), SnapshotRepositoryError>;

    /// Delete the record
    async fn delete(&self) -> Result<(), SnapshotRepositoryError>;
}
