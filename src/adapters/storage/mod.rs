//! Storage Adapters
//!
//! Implementations of the SlotStore port.
//!
//! ## Available Adapters
//!
//! - **FileSlotStore** - One JSON document on disk
//! - **InMemorySlotStore** - Shared in-process map (testing/development)
//!
//! ## Usage
//!
//! ```ignore
//! use adapters::storage::{FileSlotStore, InMemorySlotStore};
//!
//! // Production: file-based storage
//! let store = FileSlotStore::open("./data/slots.json")?;
//!
//! // Testing: in-memory storage
//! let store = InMemorySlotStore::new();
//! ```

mod file_slot_store;
mod in_memory_slot_store;

pub use file_slot_store::FileSlotStore;
pub use in_memory_slot_store::InMemorySlotStore;
