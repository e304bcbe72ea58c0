//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `storage` - Slot stores (file, in-memory)
//! - `remote` - Remote store clients (HTTP, in-memory)
//! - `snapshot` - Snapshot repositories behind `/store` (Redis, in-memory)
//! - `http` - Axum routes for the store proxy

pub mod http;
pub mod remote;
pub mod snapshot;
pub mod storage;

pub use remote::{HttpRemoteStore, HttpRemoteStoreConfig, InMemoryRemoteStore};
pub use snapshot::{InMemorySnapshotRepository, RedisSnapshotRepository};
pub use storage::{FileSlotStore, InMemorySlotStore};
