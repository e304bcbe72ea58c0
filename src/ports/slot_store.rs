//! Slot Store Port - raw key/value persistence behind the reactive slots.
//!
//! Values are stored as the JSON text the slot service produced. The store
//! does not interpret them, so a corrupt value is only detected on read.

use tokio::sync::broadcast;

/// Errors that can occur in a slot store
#[derive(Debug, Clone, thiserror::Error)]
pub enum SlotStoreError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Slot store unavailable: {0}")]
    Unavailable(String),
}

/// Change signal raised by the storage layer itself.
///
/// Every service sharing a store sees these, including writes made
/// through another service instance (another tab, another process).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageEvent {
    /// A single key was written or removed.
    Changed { key: String },
    /// Many keys changed at once; consumers should resynchronize.
    Cleared,
}

/// Port for synchronous slot persistence
pub trait SlotStore: Send + Sync {
    /// Raw stored text for `key`, if any
    fn get(&self, key: &str) -> Result<Option<String>, SlotStoreError>;

    /// Replace the stored text for `key`
    fn set(&self, key: &str, raw: &str) -> Result<(), SlotStoreError>;

    /// Delete `key`; deleting a missing key is not an error
    fn remove(&self, key: &str) -> Result<(), SlotStoreError>;

    /// Every stored key
    fn keys(&self) -> Result<Vec<String>, SlotStoreError>;

    /// Storage-level change feed, when the backend can observe other writers
    fn subscribe_events(&self) -> Option<broadcast::Receiver<StorageEvent>> {
        None
    }
}
