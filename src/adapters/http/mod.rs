//! HTTP adapters - REST API implementations.

pub mod store;

pub use store::{store_router, store_routes, StoreAppState};
