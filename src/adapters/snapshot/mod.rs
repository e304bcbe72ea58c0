//! Snapshot Repository Adapters
//!
//! Backends for the single shared record served by the `/store` routes.
//!
//! ## Available Adapters
//!
//! - **RedisSnapshotRepository** - One JSON string under `revenue-desk-data`
//! - **InMemorySnapshotRepository** - Process memory (testing/development)
//!
//! ## Usage
//!
//! ```ignore
//! let repo = RedisSnapshotRepository::connect("redis://127.0.0.1/").await?;
//! let state = StoreAppState::new(Some(Arc::new(repo)));
//! ```

mod in_memory_snapshot_repository;
mod redis_snapshot_repository;

pub use in_memory_snapshot_repository::InMemorySnapshotRepository;
pub use redis_snapshot_repository::{RedisSnapshotRepository, SNAPSHOT_KEY};
