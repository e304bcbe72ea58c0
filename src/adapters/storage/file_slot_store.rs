//! File-based Slot Store Adapter
//!
//! Keeps every slot in one JSON document on disk (`key -> raw text`).
//! The document is loaded once and rewritten through a temporary file on
//! each change, so a crash mid-write leaves the previous version intact.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tokio::sync::broadcast;

use crate::ports::{SlotStore, SlotStoreError, StorageEvent};

const EVENT_CAPACITY: usize = 256;

/// File-backed storage for slot values
#[derive(Debug)]
pub struct FileSlotStore {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, String>>,
    events: broadcast::Sender<StorageEvent>,
}

impl FileSlotStore {
    /// Open (or create) the slot document at `path`
    ///
    /// # Errors
    /// Returns `SlotStoreError::Io` if the file exists but cannot be read
    /// or is not a JSON object of strings.
    ///
    /// # Example
    /// ```ignore
    /// let store = FileSlotStore::open("./data/slots.json")?;
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SlotStoreError> {
        let path = path.as_ref().to_path_buf();
        let entries = match fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => BTreeMap::new(),
            Ok(text) => serde_json::from_str(&text).map_err(|e| {
                SlotStoreError::Io(format!("{} is not a slot document: {}", path.display(), e))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(SlotStoreError::Io(e.to_string())),
        };

        tracing::debug!(path = %path.display(), slots = entries.len(), "Opened slot store");

        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Ok(Self {
            path,
            entries: RwLock::new(entries),
            events,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Ensure the parent directory exists
    fn ensure_dir(&self) -> Result<(), SlotStoreError> {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => {
                fs::create_dir_all(dir).map_err(|e| SlotStoreError::Io(e.to_string()))
            }
            _ => Ok(()),
        }
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), SlotStoreError> {
        self.ensure_dir()?;
        let json = serde_json::to_string_pretty(entries)
            .map_err(|e| SlotStoreError::Io(e.to_string()))?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| SlotStoreError::Io(e.to_string()))?;
        fs::rename(&tmp, &self.path).map_err(|e| SlotStoreError::Io(e.to_string()))
    }

    fn notify(&self, key: &str) {
        let _ = self.events.send(StorageEvent::Changed {
            key: key.to_string(),
        });
    }
}

impl SlotStore for FileSlotStore {
    fn get(&self, key: &str) -> Result<Option<String>, SlotStoreError> {
        Ok(self.entries.read().map_err(poisoned)?.get(key).cloned())
    }

    fn set(&self, key: &str, raw: &str) -> Result<(), SlotStoreError> {
        {
            let mut entries = self.entries.write().map_err(poisoned)?;
            entries.insert(key.to_string(), raw.to_string());
            self.persist(&entries)?;
        }
        self.notify(key);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), SlotStoreError> {
        let removed = {
            let mut entries = self.entries.write().map_err(poisoned)?;
            let removed = entries.remove(key).is_some();
            if removed {
                self.persist(&entries)?;
            }
            removed
        };
        if removed {
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
    SlotStoreError::Unavailable("slot file lock poisoned".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_store_persists_across_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("slots.json");

        let store = FileSlotStore::open(&path).unwrap();
        store.set("revenue-desk-current-year", "2025").unwrap();
        drop(store);

        let reopened = FileSlotStore::open(&path).unwrap();
        assert_eq!(
            reopened.get("revenue-desk-current-year").unwrap().as_deref(),
            Some("2025")
        );
    }

    #[test]
    fn test_file_store_creates_missing_directories() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("dir").join("slots.json");

        let store = FileSlotStore::open(&path).unwrap();
        store.set("k", "1").unwrap();

        assert!(path.exists());
    }

    #[test]
    fn test_file_store_remove_rewrites_document() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("slots.json");

        let store = FileSlotStore::open(&path).unwrap();
        store.set("a", "1").unwrap();
        store.set("b", "2").unwrap();
        store.remove("a").unwrap();

        let reopened = FileSlotStore::open(&path).unwrap();
        assert_eq!(reopened.keys().unwrap(), vec!["b".to_string()]);
    }

    #[test]
    fn test_file_store_rejects_foreign_document() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("slots.json");
        fs::write(&path, "[1, 2, 3]").unwrap();

        let result = FileSlotStore::open(&path);
        assert!(matches!(result, Err(SlotStoreError::Io(_))));
    }

    #[test]
    fn test_file_store_keeps_corrupt_values_verbatim() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("slots.json");

        let store = FileSlotStore::open(&path).unwrap();
        store.set("broken", "{not json").unwrap();

        let reopened = FileSlotStore::open(&path).unwrap();
        assert_eq!(reopened.get("broken").unwrap().as_deref(), Some("{not json"));
    }
}
