//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `SlotStore` - Synchronous raw storage behind the reactive slots
//! - `RemoteStore` - Bulk snapshot exchange used by the sync coordinator
//! - `SnapshotRepository` - The single shared record served at `/store`

mod remote_store;
mod slot_store;
mod snapshot_repository;

pub use remote_store::{RemoteStore, RemoteStoreError, SaveReceipt};
pub use slot_store::{SlotStore, SlotStoreError, StorageEvent};
pub use snapshot_repository::{SnapshotRepository, SnapshotRepositoryError};
