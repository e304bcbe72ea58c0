//! In-Memory Slot Store Adapter
//!
//! Keeps slot text in a shared map. Clones share the same map and change
//! feed, which makes two services over one store behave like two tabs over
//! one browser profile. Useful for testing and development.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;

use crate::ports::{SlotStore, SlotStoreError, StorageEvent};

const EVENT_CAPACITY: usize = 256;

/// In-memory storage for slot values
#[derive(Debug, Clone)]
pub struct InMemorySlotStore {
    entries: Arc<RwLock<BTreeMap<String, String>>>,
    events: broadcast::Sender<StorageEvent>,
}

impl InMemorySlotStore {
    /// Create an empty store
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            entries: Arc::new(RwLock::new(BTreeMap::new())),
            events,
        }
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every key (useful for tests)
    pub fn clear(&self) -> Result<(), SlotStoreError> {
        self.entries.write().map_err(poisoned)?.clear();
        let _ = self.events.send(StorageEvent::Cleared);
        Ok(())
    }

    fn notify(&self, key: &str) {
        // No receivers is fine: nobody is listening yet.
        let _ = self.events.send(StorageEvent::Changed {
            key: key.to_string(),
        });
    }
}

impl Default for InMemorySlotStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SlotStore for InMemorySlotStore {
    fn get(&self, key: &str) -> Result<Option<String>, SlotStoreError> {
        Ok(self.entries.read().map_err(poisoned)?.get(key).cloned())
    }

    fn set(&self, key: &str, raw: &str) -> Result<(), SlotStoreError> {
        self.entries
            .write()
            .map_err(poisoned)?
            .insert(key.to_string(), raw.to_string());
        self.notify(key);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), SlotStoreError> {
        let removed = self.entries.write().map_err(poisoned)?.remove(key);
        if removed.is_some() {
            self.notify(key);
        }
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, SlotStoreError> {
        Ok(self.entries.read().map_err(poisoned)?.keys().cloned().collect())
    }

    fn subscribe_events(&self) -> Option<broadcast::Receiver<StorageEvent>> {
        Some(self.events.subscribe())
    }
}

fn poisoned<T>(_: std::sync::PoisonError<T>) -> SlotStoreError {
    SlotStoreError::Unavailable("slot map lock poisoned".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_remove() {
        let store = InMemorySlotStore::new();
        store.set("a", "1").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));
        store.remove("a").unwrap();
        assert_eq!(store.get("a").unwrap(), None);
        assert!(store.is_empty());
    }

    #[test]
    fn clones_share_entries() {
        let store = InMemorySlotStore::new();
        let other = store.clone();
        store.set("k", "\"v\"").unwrap();
        assert_eq!(other.get("k").unwrap().as_deref(), Some("\"v\""));
    }

    #[test]
    fn writes_raise_storage_events() {
        let store = InMemorySlotStore::new();
        let mut events = store.subscribe_events().unwrap();

        store.set("k", "1").unwrap();
        store.remove("missing").unwrap();
        store.remove("k").unwrap();

        let key = |e| match e {
            StorageEvent::Changed { key } => key,
            StorageEvent::Cleared => "*".to_string(),
        };
        assert_eq!(key(events.try_recv().unwrap()), "k");
        assert_eq!(key(events.try_recv().unwrap()), "k");
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn keys_are_sorted() {
        let store = InMemorySlotStore::new();
        store.set("b", "1").unwrap();
        store.set("a", "1").unwrap();
        assert_eq!(store.keys().unwrap(), vec!["a".to_string(), "b".to_string()]);
    }
}
