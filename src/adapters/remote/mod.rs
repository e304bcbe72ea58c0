//! Remote Store Adapters
//!
//! Implementations of the RemoteStore port used by the sync coordinator.
//!
//! ## Available Adapters
//!
//! - **HttpRemoteStore** - JSON over HTTP against the `/store` proxy
//! - **InMemoryRemoteStore** - Test double with failure injection

mod http_remote_store;
mod in_memory_remote_store;

pub use http_remote_store::{HttpRemoteStore, HttpRemoteStoreConfig};
pub use in_memory_remote_store::InMemoryRemoteStore;
