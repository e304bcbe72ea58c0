//! SyncCoordinator - best-effort mirroring of the slot namespace to a remote store.
//!
//! 1. On startup, `initial_load` pulls the remote snapshot and applies every
//!    differing key locally.
//! 2. `start` watches the local-write feed and, after `debounce` of quiet,
//!    uploads the whole namespace as one snapshot (last writer wins).
//! 3. `clear_all` wipes remote then local, after a two-step confirmation.
//!
//! ## Configuration
//!
//! | Setting | Default | Description |
//! |---------|---------|-------------|
//! | `debounce` | 2000ms | Quiet period before an upload |
//!
//! Failures never propagate out of the background task. They are logged and
//! reflected in the published [`SyncState`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time;

use super::slots::{SlotError, SlotService, Subscription};
use crate::domain::foundation::Timestamp;
use crate::ports::{RemoteStore, RemoteStoreError, SaveReceipt};

/// Configuration for the SyncCoordinator.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Quiet period after the last local write before uploading.
    pub debounce: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(2000),
        }
    }
}

impl SyncConfig {
    /// Create config with a custom debounce window.
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    Idle,
    Syncing,
    Saved,
    Error,
}

/// Published sync indicator.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncState {
    pub status: SyncStatus,
    pub last_synced: Option<Timestamp>,
}

impl SyncState {
    fn idle() -> Self {
        Self {
            status: SyncStatus::Idle,
            last_synced: None,
        }
    }
}

/// Errors from an explicit upload.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error(transparent)]
    Slots(#[from] SlotError),

    #[error(transparent)]
    Remote(#[from] RemoteStoreError),
}

// ════════════════════════════════════════════════════════════════════════════════
// Reset confirmation
// ════════════════════════════════════════════════════════════════════════════════

/// First step of a full reset.
#[derive(Debug)]
pub struct ResetRequest(());

/// Confirmed once; needs a second confirmation.
#[derive(Debug)]
pub struct ResetConfirmedOnce(());

/// Confirmed twice. Only obtainable through [`ResetRequest`].
#[derive(Debug)]
pub struct ConfirmedReset(());

impl ResetRequest {
    pub fn new() -> Self {
        Self(())
    }

    pub fn confirm(self) -> ResetConfirmedOnce {
        ResetConfirmedOnce(())
    }
}

impl Default for ResetRequest {
    fn default() -> Self {
        Self::new()
    }
}

impl ResetConfirmedOnce {
    pub fn confirm_again(self) -> ConfirmedReset {
        ConfirmedReset(())
    }
}

/// Result of [`SyncCoordinator::clear_all`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResetOutcome {
    pub remote_cleared: bool,
    pub local_keys_removed: usize,
}

// ════════════════════════════════════════════════════════════════════════════════
// Coordinator
// ════════════════════════════════════════════════════════════════════════════════

/// Keeps the remote record in step with local slots.
pub struct SyncCoordinator {
    slots: Arc<SlotService>,
    remote: Arc<dyn RemoteStore>,
    config: SyncConfig,
    state: watch::Sender<SyncState>,
    upload: Mutex<()>,
    /// Bumped by every reset; writes stamped with an older value are not uploaded.
    generation: Arc<AtomicU64>,
}

impl SyncCoordinator {
    /// Create a coordinator with default configuration.
    pub fn new(slots: Arc<SlotService>, remote: Arc<dyn RemoteStore>) -> Self {
        Self::with_config(slots, remote, SyncConfig::default())
    }

    /// Create a coordinator with custom configuration.
    pub fn with_config(
        slots: Arc<SlotService>,
        remote: Arc<dyn RemoteStore>,
        config: SyncConfig,
    ) -> Self {
        let (state, _) = watch::channel(SyncState::idle());
        Self {
            slots,
            remote,
            config,
            state,
            upload: Mutex::new(()),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Current indicator value.
    pub fn state(&self) -> SyncState {
        self.state.borrow().clone()
    }

    /// Receiver that observes every status change.
    pub fn subscribe(&self) -> watch::Receiver<SyncState> {
        self.state.subscribe()
    }

    fn set_status(&self, status: SyncStatus) {
        self.state.send_modify(|s| {
            s.status = status;
            if status == SyncStatus::Saved {
                s.last_synced = Some(Timestamp::now());
            }
        });
    }

    /// Pulls the remote snapshot and applies differing keys.
    ///
    /// Returns the number of keys updated; failures are logged and yield 0.
    pub async fn initial_load(&self) -> usize {
        self.set_status(SyncStatus::Syncing);

        let snapshot = match self.remote.load().await {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => {
                tracing::info!("No remote data to load");
                self.set_status(SyncStatus::Idle);
                return 0;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Initial remote load failed, continuing locally");
                self.set_status(SyncStatus::Idle);
                return 0;
            }
        };

        match self.slots.apply_remote_snapshot(&snapshot) {
            Ok(updated) => {
                tracing::info!(updated, "Applied remote snapshot");
                self.set_status(SyncStatus::Saved);
                updated
            }
            Err(e) => {
                tracing::warn!(error = %e, "Could not apply remote snapshot");
                self.set_status(SyncStatus::Idle);
                0
            }
        }
    }

    /// Uploads the namespace immediately.
    pub async fn push_now(&self) -> Result<SaveReceipt, SyncError> {
        let _in_flight = self.upload.lock().await;
        self.set_status(SyncStatus::Syncing);

        let result = match self.slots.export_snapshot() {
            Ok(snapshot) => self
                .remote
                .save(&snapshot)
                .await
                .map_err(SyncError::from),
            Err(e) => Err(SyncError::from(e)),
        };

        match &result {
            Ok(_) => {
                tracing::debug!("Remote snapshot saved");
                self.set_status(SyncStatus::Saved);
            }
            Err(e) => {
                tracing::error!(error = %e, "Remote upload failed");
                self.set_status(SyncStatus::Error);
            }
        }
        result
    }

    /// Starts the debounced upload task.
    ///
    /// The task stops when the returned handle is shut down or dropped.
    pub fn start(self: &Arc<Self>) -> SyncHandle {
        let (notices_tx, mut notices) = mpsc::unbounded_channel::<u64>();
        let stamp = Arc::clone(&self.generation);
        let subscription = self.slots.subscribe_local_writes(move |_key| {
            let _ = notices_tx.send(stamp.load(Ordering::SeqCst));
        });

        let (shutdown_tx, mut shutdown) = watch::channel(false);
        let coordinator = Arc::clone(self);
        let debounce = self.config.debounce;

        let task = tokio::spawn(async move {
            loop {
                let mut latest = tokio::select! {
                    _ = shutdown.changed() => return,
                    notice = notices.recv() => match notice {
                        Some(generation) => generation,
                        None => return,
                    },
                };

                // Trailing window: every further write restarts it.
                loop {
                    tokio::select! {
                        _ = shutdown.changed() => return,
                        notice = notices.recv() => match notice {
                            Some(generation) => latest = generation,
                            None => return,
                        },
                        _ = time::sleep(debounce) => break,
                    }
                }

                if latest != coordinator.generation.load(Ordering::SeqCst) {
                    tracing::debug!("Pending upload dropped by reset");
                    continue;
                }

                // Already logged and published through the status.
                let _ = coordinator.push_now().await;
            }
        });

        SyncHandle {
            shutdown: shutdown_tx,
            task,
            subscription,
        }
    }

    /// Full reset: clears the remote record, then always wipes local slots.
    pub async fn clear_all(&self, _confirmed: ConfirmedReset) -> Result<ResetOutcome, SlotError> {
        let _in_flight = self.upload.lock().await;
        self.generation.fetch_add(1, Ordering::SeqCst);

        let remote_cleared = match self.remote.clear().await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Remote clear failed, wiping local data only");
                false
            }
        };

        let local_keys_removed = self.slots.wipe_prefix(self.slots.namespace())?;
        self.state.send_replace(SyncState::idle());

        tracing::info!(remote_cleared, local_keys_removed, "All data cleared");
        Ok(ResetOutcome {
            remote_cleared,
            local_keys_removed,
        })
    }
}

/// Running debounce task.
pub struct SyncHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
    subscription: Subscription,
}

impl SyncHandle {
    /// Stops the task, cancelling any pending upload that has not started.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        drop(self.subscription);
        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "Sync task ended abnormally");
        }
    }
}
