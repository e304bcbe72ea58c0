//! HTTP adapter for the shared store record (`/api/store`).
//!
//! Thin proxy in front of a `SnapshotRepository`, used by the remote sync
//! client. The record is replaced wholesale; there is no merge.

mod dto;
mod handlers;
mod routes;

pub use dto::{ClearResponse, ErrorResponse, SaveResponse};
pub use handlers::{StoreApiError, StoreAppState};
pub use routes::{store_router, store_routes};
