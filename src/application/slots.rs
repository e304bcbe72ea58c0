//! Reactive persisted slots.
//!
//! `SlotService` keeps the canonical in-memory value of every slot it has
//! seen, persists writes through a [`SlotStore`], and notifies subscribers
//! synchronously after each committed change. `SlotBinding<T>` is the typed
//! view a caller holds on one key.
//!
//! ## Change sources
//!
//! | Source | Key subscribers | Local-write feed |
//! |--------|-----------------|------------------|
//! | `write` / `update` / `remove` | yes | yes |
//! | `restore_snapshot` | yes | yes |
//! | `apply_remote_snapshot` | yes | no |
//! | `pump_storage_events` (other writers) | yes | no |
//! | `wipe_prefix` | yes | no |
//!
//! ## Usage
//!
//! ```ignore
//! let slots = Arc::new(SlotService::new(Arc::new(InMemorySlotStore::new()), "revenue-desk-"));
//!
//! let year = SlotBinding::new(slots.clone(), "revenue-desk-current-year", || 2025);
//! slots.write("revenue-desk-current-year", &2026)?;
//! assert_eq!(year.get(), 2026);
//! ```

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock, Weak};
use tokio::sync::broadcast::{self, error::TryRecvError};

use crate::domain::foundation::StoreSnapshot;
use crate::ports::{SlotStore, SlotStoreError, StorageEvent};

/// Errors surfaced by the slot service.
#[derive(Debug, thiserror::Error)]
pub enum SlotError {
    #[error(transparent)]
    Storage(#[from] SlotStoreError),

    #[error("Cannot serialize value for '{key}': {message}")]
    Serialization { key: String, message: String },
}

/// What a key subscriber is told.
#[derive(Debug, Clone, PartialEq)]
pub enum SlotChange {
    Updated(Value),
    Removed,
}

type KeyCallback = Arc<dyn Fn(&SlotChange) + Send + Sync>;
type WriteCallback = Arc<dyn Fn(&str) + Send + Sync>;

// ════════════════════════════════════════════════════════════════════════════════
// Subscriptions
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Default)]
struct Registry {
    next_id: AtomicU64,
    by_key: RwLock<HashMap<String, Vec<(u64, KeyCallback)>>>,
    local_writes: RwLock<Vec<(u64, WriteCallback)>>,
}

impl Registry {
    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    fn key_callbacks(&self, key: &str) -> Vec<KeyCallback> {
        self.by_key
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .map(|subs| subs.iter().map(|(_, cb)| cb.clone()).collect())
            .unwrap_or_default()
    }

    fn write_callbacks(&self) -> Vec<WriteCallback> {
        self.local_writes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, cb)| cb.clone())
            .collect()
    }

    fn subscribed_keys(&self) -> Vec<String> {
        self.by_key
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    fn detach(&self, id: u64, target: &Target) {
        match target {
            Target::Key(key) => {
                let mut by_key = self.by_key.write().unwrap_or_else(PoisonError::into_inner);
                if let Some(subs) = by_key.get_mut(key) {
                    subs.retain(|(sub_id, _)| *sub_id != id);
                    if subs.is_empty() {
                        by_key.remove(key);
                    }
                }
            }
            Target::LocalWrites => self
                .local_writes
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .retain(|(sub_id, _)| *sub_id != id),
        }
    }
}

#[derive(Debug)]
enum Target {
    Key(String),
    LocalWrites,
}

/// Handle to a registered callback. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    registry: Weak<Registry>,
    id: u64,
    target: Target,
}

impl Subscription {
    /// Detaches the callback now.
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.detach(self.id, &self.target);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("target", &self.target)
            .finish()
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Slot service
// ════════════════════════════════════════════════════════════════════════════════

/// Key/value persistence with change notification.
pub struct SlotService {
    store: Arc<dyn SlotStore>,
    namespace: String,
    cache: RwLock<HashMap<String, Value>>,
    registry: Arc<Registry>,
    storage_events: Mutex<Option<broadcast::Receiver<StorageEvent>>>,
}

impl SlotService {
    /// Creates a service over `store`. `namespace` is the key prefix used by
    /// export, restore, remote sync and the full wipe.
    pub fn new(store: Arc<dyn SlotStore>, namespace: impl Into<String>) -> Self {
        let storage_events = store.subscribe_events();
        Self {
            store,
            namespace: namespace.into(),
            cache: RwLock::new(HashMap::new()),
            registry: Arc::new(Registry::default()),
            storage_events: Mutex::new(storage_events),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// `{namespace}{suffix}`
    pub fn key(&self, suffix: &str) -> String {
        format!("{}{}", self.namespace, suffix)
    }

    // === Reads ===

    /// Stored value for `key`, or `default` when absent, corrupt or of the
    /// wrong shape. The default is never persisted.
    pub fn read<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.read_or_else(key, || default)
    }

    /// Like [`read`](Self::read) with a lazily built default.
    pub fn read_or_else<T: DeserializeOwned>(&self, key: &str, default: impl FnOnce() -> T) -> T {
        match self.current_value(key) {
            Some(value) => decode(key, value).unwrap_or_else(default),
            None => default(),
        }
    }

    /// Last known JSON value, loading it from the store on first access.
    pub fn current_value(&self, key: &str) -> Option<Value> {
        if let Some(value) = self.cache_read().get(key) {
            return Some(value.clone());
        }

        let value = self.load_from_store(key)?;
        self.cache_write().insert(key.to_string(), value.clone());
        Some(value)
    }

    // === Writes ===

    /// Persists `value` and notifies subscribers of `key`.
    ///
    /// A value whose JSON form does not read back as `T` (a non-finite
    /// float turns into `null`) is refused and nothing is committed.
    pub fn write<T: Serialize + DeserializeOwned>(&self, key: &str, value: &T) -> Result<(), SlotError> {
        let serialization = |message: String| SlotError::Serialization {
            key: key.to_string(),
            message,
        };
        let json = serde_json::to_value(value).map_err(|e| serialization(e.to_string()))?;
        if let Err(e) = serde_json::from_value::<T>(json.clone()) {
            tracing::warn!(key = %key, error = %e, "Refusing slot write that would not read back");
            return Err(serialization(format!("value would not read back: {e}")));
        }
        self.commit(key, json, true)
    }

    /// Applies `f` to the last known value (or `default`) and writes the result.
    pub fn update<T, F>(&self, key: &str, default: T, f: F) -> Result<T, SlotError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(T) -> T,
    {
        let next = f(self.read(key, default));
        self.write(key, &next)?;
        Ok(next)
    }

    /// Deletes `key`; subscribers see [`SlotChange::Removed`].
    pub fn remove(&self, key: &str) -> Result<(), SlotError> {
        self.store.remove(key)?;
        self.cache_write().remove(key);
        self.notify_key(key, &SlotChange::Removed);
        self.notify_local_write(key);
        Ok(())
    }

    /// Removes every key starting with `prefix`. Returns the number removed.
    pub fn wipe_prefix(&self, prefix: &str) -> Result<usize, SlotError> {
        let keys: Vec<String> = self
            .store
            .keys()?
            .into_iter()
            .filter(|k| k.starts_with(prefix))
            .collect();

        for key in &keys {
            self.store.remove(key)?;
        }

        let mut stale: BTreeSet<String> = keys.iter().cloned().collect();
        {
            let mut cache = self.cache_write();
            stale.extend(cache.keys().filter(|k| k.starts_with(prefix)).cloned());
            cache.retain(|k, _| !k.starts_with(prefix));
        }
        for key in &stale {
            self.notify_key(key, &SlotChange::Removed);
        }

        tracing::info!(prefix = %prefix, removed = keys.len(), "Wiped slots");
        Ok(keys.len())
    }

    // === Subscriptions ===

    /// Calls `callback` after every change to `key`, whatever its source.
    pub fn subscribe<F>(&self, key: &str, callback: F) -> Subscription
    where
        F: Fn(&SlotChange) + Send + Sync + 'static,
    {
        let id = self.registry.next_id();
        self.registry
            .by_key
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(key.to_string())
            .or_default()
            .push((id, Arc::new(callback)));

        Subscription {
            registry: Arc::downgrade(&self.registry),
            id,
            target: Target::Key(key.to_string()),
        }
    }

    /// Calls `callback` with the key of every locally originated write.
    pub fn subscribe_local_writes<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        let id = self.registry.next_id();
        self.registry
            .local_writes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(callback)));

        Subscription {
            registry: Arc::downgrade(&self.registry),
            id,
            target: Target::LocalWrites,
        }
    }

    /// Drains the store's change feed and re-reads every key another writer
    /// touched. Returns the number of keys whose value changed.
    pub fn pump_storage_events(&self) -> usize {
        let mut touched = BTreeSet::new();
        let mut resync_all = false;

        {
            let mut guard = self
                .storage_events
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            let Some(events) = guard.as_mut() else {
                return 0;
            };
            loop {
                match events.try_recv() {
                    Ok(StorageEvent::Changed { key }) => {
                        touched.insert(key);
                    }
                    Ok(StorageEvent::Cleared) => resync_all = true,
                    Err(TryRecvError::Lagged(skipped)) => {
                        tracing::debug!(skipped, "Storage feed lagged, resynchronizing");
                        resync_all = true;
                    }
                    Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
                }
            }
        }

        if resync_all {
            touched.extend(self.cache_read().keys().cloned());
            touched.extend(self.registry.subscribed_keys());
            match self.store.keys() {
                Ok(keys) => touched.extend(keys),
                Err(e) => tracing::warn!(error = %e, "Cannot list slots during resync"),
            }
        }

        touched.iter().filter(|key| self.resync_key(key)).count()
    }

    // === Snapshots ===

    /// Every slot under the namespace. Unparsable values export as raw strings.
    pub fn export_snapshot(&self) -> Result<StoreSnapshot, SlotError> {
        let mut snapshot = StoreSnapshot::new();
        for key in self.store.keys()? {
            if !key.starts_with(&self.namespace) {
                continue;
            }
            if let Some(raw) = self.store.get(&key)? {
                let value = serde_json::from_str(&raw).unwrap_or(Value::String(raw));
                snapshot.insert(key, value);
            }
        }
        Ok(snapshot)
    }

    /// Imports a backup document. Keys outside the namespace are ignored.
    ///
    /// The cache is dropped afterwards so every binding reloads from storage.
    pub fn restore_snapshot(&self, snapshot: &StoreSnapshot) -> Result<usize, SlotError> {
        let mut imported = Vec::new();
        for (key, value) in snapshot.with_prefix(&self.namespace) {
            self.store.set(key, &value.to_string())?;
            imported.push((key.clone(), value.clone()));
        }

        self.cache_write().clear();
        for (key, value) in &imported {
            self.notify_key(key, &SlotChange::Updated(value.clone()));
            self.notify_local_write(key);
        }

        tracing::info!(imported = imported.len(), "Restored slots from backup");
        Ok(imported.len())
    }

    /// Overwrites local keys whose value differs from the remote copy.
    ///
    /// Returns the number of keys updated. These changes do not reach the
    /// local-write feed.
    pub fn apply_remote_snapshot(&self, snapshot: &StoreSnapshot) -> Result<usize, SlotError> {
        let mut updated = 0;
        for (key, value) in snapshot.with_prefix(&self.namespace) {
            if self.current_value(key).as_ref() == Some(value) {
                continue;
            }
            self.commit(key, value.clone(), false)?;
            updated += 1;
        }
        Ok(updated)
    }

    // === Internals ===

    fn commit(&self, key: &str, value: Value, local: bool) -> Result<(), SlotError> {
        self.store.set(key, &value.to_string())?;
        self.cache_write().insert(key.to_string(), value.clone());
        tracing::debug!(key = %key, local, "Slot written");

        self.notify_key(key, &SlotChange::Updated(value));
        if local {
            self.notify_local_write(key);
        }
        Ok(())
    }

    /// Re-reads `key` from storage; notifies when it differs from the cache.
    fn resync_key(&self, key: &str) -> bool {
        let stored = self.load_from_store(key);
        let changed = {
            let mut cache = self.cache_write();
            if cache.get(key) == stored.as_ref() {
                false
            } else {
                match &stored {
                    Some(value) => cache.insert(key.to_string(), value.clone()),
                    None => cache.remove(key),
                };
                true
            }
        };

        if changed {
            let change = match stored {
                Some(value) => SlotChange::Updated(value),
                None => SlotChange::Removed,
            };
            self.notify_key(key, &change);
        }
        changed
    }

    fn load_from_store(&self, key: &str) -> Option<Value> {
        let raw = match self.store.get(key) {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Slot read failed");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Corrupt slot value ignored");
                None
            }
        }
    }

    fn notify_key(&self, key: &str, change: &SlotChange) {
        for callback in self.registry.key_callbacks(key) {
            callback(change);
        }
    }

    fn notify_local_write(&self, key: &str) {
        for callback in self.registry.write_callbacks() {
            callback(key);
        }
    }

    fn cache_read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, Value>> {
        self.cache.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn cache_write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, Value>> {
        self.cache.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Converts a stored value to `T`; a shape mismatch is logged and dropped.
fn decode<T: DeserializeOwned>(key: &str, value: Value) -> Option<T> {
    match serde_json::from_value(value) {
        Ok(decoded) => Some(decoded),
        Err(e) => {
            tracing::warn!(key = %key, error = %e, "Slot value has unexpected shape");
            None
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Typed binding
// ════════════════════════════════════════════════════════════════════════════════

type DefaultFactory<T> = Arc<dyn Fn() -> T + Send + Sync>;

/// Typed, self-updating view of one slot.
///
/// The binding follows every change to its key. [`rebind`](Self::rebind)
/// points it at another key and re-resolves from scratch.
pub struct SlotBinding<T> {
    service: Arc<SlotService>,
    key: String,
    default: DefaultFactory<T>,
    current: Arc<RwLock<T>>,
    _subscription: Subscription,
}

impl<T> SlotBinding<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    pub fn new(
        service: Arc<SlotService>,
        key: impl Into<String>,
        default: impl Fn() -> T + Send + Sync + 'static,
    ) -> Self {
        let key = key.into();
        let default: DefaultFactory<T> = Arc::new(default);
        let (current, subscription) = attach(&service, &key, &default);
        Self {
            service,
            key,
            default,
            current,
            _subscription: subscription,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Current value.
    pub fn get(&self) -> T {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replaces the value.
    pub fn set(&self, value: &T) -> Result<(), SlotError> {
        self.service.write(&self.key, value)
    }

    /// Applies `f` to the last committed value.
    pub fn update(&self, f: impl FnOnce(T) -> T) -> Result<T, SlotError> {
        let default = (self.default)();
        self.service.update(&self.key, default, f)
    }

    /// Points the binding at `key`, discarding the old value immediately.
    pub fn rebind(&mut self, key: impl Into<String>) {
        let key = key.into();
        if key == self.key {
            return;
        }
        let (current, subscription) = attach(&self.service, &key, &self.default);
        self.current = current;
        self._subscription = subscription;
        self.key = key;
    }
}

fn attach<T>(
    service: &SlotService,
    key: &str,
    default: &DefaultFactory<T>,
) -> (Arc<RwLock<T>>, Subscription)
where
    T: DeserializeOwned + Send + Sync + 'static,
{
    let current = Arc::new(RwLock::new(service.read_or_else(key, || default())));

    let target = Arc::clone(&current);
    let fallback = Arc::clone(default);
    let owned_key = key.to_string();
    let subscription = service.subscribe(key, move |change| {
        let next = match change {
            SlotChange::Updated(value) => {
                decode(&owned_key, value.clone()).unwrap_or_else(|| fallback())
            }
            SlotChange::Removed => fallback(),
        };
        *target.write().unwrap_or_else(PoisonError::into_inner) = next;
    });

    (current, subscription)
}

impl<T: std::fmt::Debug> std::fmt::Debug for SlotBinding<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlotBinding")
            .field("key", &self.key)
            .field("current", &self.current)
            .finish()
    }
}

#[cfg(test)]
#[path = "slots_test.rs"]
mod tests;
