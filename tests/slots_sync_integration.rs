//! File-backed slots kept in step with a remote store.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use revenue_desk::adapters::remote::InMemoryRemoteStore;
use revenue_desk::adapters::storage::FileSlotStore;
use revenue_desk::application::{
    ResetRequest, SlotBinding, SlotService, SyncConfig, SyncCoordinator, SyncStatus,
};
use revenue_desk::domain::foundation::StoreSnapshot;
use revenue_desk::ports::RemoteStore;

const NS: &str = "revenue-desk-";

fn open_slots(dir: &tempfile::TempDir) -> Arc<SlotService> {
    let store = FileSlotStore::open(dir.path().join("slots.json")).unwrap();
    Arc::new(SlotService::new(Arc::new(store), NS))
}

fn coordinator(slots: Arc<SlotService>, remote: &InMemoryRemoteStore) -> Arc<SyncCoordinator> {
    let remote: Arc<dyn RemoteStore> = Arc::new(remote.clone());
    Arc::new(SyncCoordinator::with_config(
        slots,
        remote,
        SyncConfig::default().with_debounce(Duration::from_millis(50)),
    ))
}

async fn wait_for_saves(remote: &InMemoryRemoteStore, count: usize) {
    for _ in 0..100 {
        if remote.save_count() >= count {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("expected {} uploads, saw {}", count, remote.save_count());
}

#[tokio::test]
async fn burst_of_writes_uploads_once_with_final_values() {
    let dir = tempfile::tempdir().unwrap();
    let slots = open_slots(&dir);
    let remote = InMemoryRemoteStore::new();
    let sync = coordinator(slots.clone(), &remote);
    let handle = sync.start();

    let units = SlotBinding::new(slots.clone(), "revenue-desk-main-units", || 16u32);
    for n in 1..=5u32 {
        units.set(&n).unwrap();
    }

    wait_for_saves(&remote, 1).await;
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(remote.save_count(), 1);

    let uploaded = remote.snapshot().await.unwrap();
    assert_eq!(uploaded.get("revenue-desk-main-units"), Some(&json!(5)));
    assert_eq!(sync.state().status, SyncStatus::Saved);
    assert!(sync.state().last_synced.is_some());

    handle.shutdown().await;
}

#[tokio::test]
async fn remote_data_lands_on_disk_without_echo_upload() {
    let dir = tempfile::tempdir().unwrap();
    let mut record = StoreSnapshot::new();
    record.insert("revenue-desk-main-current-year", json!(2026));
    let remote = InMemoryRemoteStore::with_snapshot(record);

    {
        let slots = open_slots(&dir);
        let sync = coordinator(slots.clone(), &remote);
        let handle = sync.start();

        assert_eq!(sync.initial_load().await, 1);
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(remote.save_count(), 0);
        handle.shutdown().await;
    }

    // Reopened from disk, no remote involved.
    let slots = open_slots(&dir);
    assert_eq!(slots.read("revenue-desk-main-current-year", 0), 2026);
}

#[tokio::test]
async fn failed_upload_surfaces_error_status() {
    let dir = tempfile::tempdir().unwrap();
    let slots = open_slots(&dir);
    let remote = InMemoryRemoteStore::new();
    remote.set_failing(true);
    let sync = coordinator(slots.clone(), &remote);

    slots.write("revenue-desk-costs", &json!({"items": []})).unwrap();
    assert!(sync.push_now().await.is_err());
    assert_eq!(sync.state().status, SyncStatus::Error);

    // Local data is untouched.
    assert!(slots.current_value("revenue-desk-costs").is_some());
}

#[tokio::test]
async fn full_reset_clears_disk_and_remote() {
    let dir = tempfile::tempdir().unwrap();
    let slots = open_slots(&dir);
    let remote = InMemoryRemoteStore::new();
    let sync = coordinator(slots.clone(), &remote);

    slots.write("revenue-desk-main-current-year", &2025).unwrap();
    slots.write("revenue-desk-costs", &json!({"items": []})).unwrap();
    sync.push_now().await.unwrap();

    let confirmed = ResetRequest::new().confirm().confirm_again();
    let outcome = sync.clear_all(confirmed).await.unwrap();
    assert!(outcome.remote_cleared);
    assert_eq!(outcome.local_keys_removed, 2);
    assert!(remote.snapshot().await.is_none());

    let reopened = open_slots(&dir);
    assert_eq!(reopened.read("revenue-desk-main-current-year", 0), 0);
}
