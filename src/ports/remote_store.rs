//! Remote Store Port - bulk snapshot exchange with the remote key/value record.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::StoreSnapshot;

/// Errors from the remote store
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RemoteStoreError {
    #[error("Remote store unreachable: {0}")]
    Unreachable(String),

    #[error("Remote store is not configured: {0}")]
    Misconfigured(String),

    #[error("Remote store rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Remote store returned an invalid response: {0}")]
    InvalidResponse(String),
}

/// Acknowledgement of a successful upload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveReceipt {
    pub success: bool,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Port for the remote copy of every slot under the namespace
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Fetch the remote snapshot
    ///
    /// # Returns
    /// `Ok(None)` when the remote has no usable data (missing record,
    /// non-JSON response).
    async fn load(&self) -> Result<Option<StoreSnapshot>, RemoteStoreError>;

    /// Replace the remote record wholesale
    async fn save(&self, snapshot: &StoreSnapshot) -> Result<SaveReceipt, RemoteStoreError>;

    /// Delete the remote record
    async fn clear(&self) -> Result<(), RemoteStoreError>;
}
