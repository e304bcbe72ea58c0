use super::*;
use crate::adapters::storage::InMemorySlotStore;
use proptest::prelude::*;
use serde_json::json;
use std::sync::atomic::AtomicUsize;

const NS: &str = "revenue-desk-";

fn service_over(store: &InMemorySlotStore) -> Arc<SlotService> {
    Arc::new(SlotService::new(Arc::new(store.clone()), NS))
}

fn service() -> Arc<SlotService> {
    service_over(&InMemorySlotStore::new())
}

// ───────────────────────────────────────────────────────────────
// Reads and writes
// ───────────────────────────────────────────────────────────────

#[test]
fn read_falls_back_without_persisting_default() {
    let store = InMemorySlotStore::new();
    let slots = service_over(&store);

    assert_eq!(slots.read("revenue-desk-current-year", 2025), 2025);
    assert!(store.is_empty());
}

#[test]
fn default_factory_only_runs_when_needed() {
    let slots = service();
    let calls = AtomicUsize::new(0);
    let factory = || {
        calls.fetch_add(1, Ordering::SeqCst);
        7
    };

    assert_eq!(slots.read_or_else("k", factory), 7);
    slots.write("k", &3).unwrap();
    assert_eq!(slots.read_or_else("k", factory), 3);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn corrupt_value_reads_as_default_and_is_overwritable() {
    let store = InMemorySlotStore::new();
    store.set("revenue-desk-apartments", "{not json").unwrap();
    let slots = service_over(&store);

    let apartments: Vec<String> = slots.read("revenue-desk-apartments", vec![]);
    assert!(apartments.is_empty());

    slots
        .write("revenue-desk-apartments", &vec!["Sea View".to_string()])
        .unwrap();
    let apartments: Vec<String> = slots.read("revenue-desk-apartments", vec![]);
    assert_eq!(apartments, vec!["Sea View".to_string()]);
}

#[test]
fn wrong_shape_reads_as_default() {
    let slots = service();
    slots.write("k", &json!({"unexpected": true})).unwrap();

    let value: Vec<u32> = slots.read("k", vec![1, 2]);
    assert_eq!(value, vec![1, 2]);
}

#[test]
fn update_applies_to_last_known_value() {
    let slots = service();
    slots.write("counter", &10).unwrap();

    let next = slots.update("counter", 0, |n: i32| n + 5).unwrap();
    assert_eq!(next, 15);
    assert_eq!(slots.read("counter", 0), 15);
}

#[test]
fn remove_notifies_removed() {
    let slots = service();
    slots.write("k", &1).unwrap();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let _sub = slots.subscribe("k", move |c| sink.lock().unwrap().push(c.clone()));

    slots.remove("k").unwrap();
    assert_eq!(*seen.lock().unwrap(), vec![SlotChange::Removed]);
    assert_eq!(slots.read("k", 0), 0);
}

#[test]
fn unreadable_value_is_refused_and_previous_value_kept() {
    let slots = service();
    let binding = SlotBinding::new(slots.clone(), "revenue-desk-rates", || vec![60.0f64]);
    binding.set(&vec![70.0, 80.0]).unwrap();

    let err = binding.set(&vec![f64::NAN]).unwrap_err();
    assert!(matches!(err, SlotError::Serialization { .. }));
    assert_eq!(binding.get(), vec![70.0, 80.0]);
    assert_eq!(slots.read("revenue-desk-rates", Vec::<f64>::new()), vec![70.0, 80.0]);
}

// ───────────────────────────────────────────────────────────────
// Subscriptions
// ───────────────────────────────────────────────────────────────

#[test]
fn subscribers_are_scoped_to_their_key() {
    let slots = service();
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let _sub = slots.subscribe("a", move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    slots.write("a", &1).unwrap();
    slots.write("b", &1).unwrap();
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[test]
fn dropping_subscription_detaches_callback() {
    let slots = service();
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let sub = slots.subscribe("a", move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    slots.write("a", &1).unwrap();
    sub.unsubscribe();
    slots.write("a", &2).unwrap();
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[test]
fn callback_may_write_other_keys() {
    let slots = service();
    let inner = slots.clone();
    let _sub = slots.subscribe("source", move |change| {
        if let SlotChange::Updated(v) = change {
            inner.write("mirror", v).unwrap();
        }
    });

    slots.write("source", &42).unwrap();
    assert_eq!(slots.read("mirror", 0), 42);
}

#[test]
fn local_write_feed_skips_remote_changes() {
    let slots = service();
    let keys = Arc::new(Mutex::new(Vec::new()));
    let sink = keys.clone();
    let _sub = slots.subscribe_local_writes(move |k| sink.lock().unwrap().push(k.to_string()));

    slots.write("revenue-desk-a", &1).unwrap();

    let mut remote = StoreSnapshot::new();
    remote.insert("revenue-desk-b", json!(2));
    assert_eq!(slots.apply_remote_snapshot(&remote).unwrap(), 1);

    assert_eq!(*keys.lock().unwrap(), vec!["revenue-desk-a".to_string()]);
    assert_eq!(slots.read("revenue-desk-b", 0), 2);
}

// ───────────────────────────────────────────────────────────────
// Bindings
// ───────────────────────────────────────────────────────────────

#[test]
fn two_bindings_converge_after_one_writes() {
    let slots = service();
    let first = SlotBinding::new(slots.clone(), "revenue-desk-units", || 16u32);
    let second = SlotBinding::new(slots.clone(), "revenue-desk-units", || 16u32);

    first.set(&20).unwrap();
    assert_eq!(first.get(), 20);
    assert_eq!(second.get(), 20);
}

#[test]
fn binding_update_uses_committed_value() {
    let slots = service();
    let binding = SlotBinding::new(slots.clone(), "k", Vec::<u32>::new);

    binding.update(|mut v| {
        v.push(1);
        v
    })
    .unwrap();
    binding.update(|mut v| {
        v.push(2);
        v
    })
    .unwrap();

    assert_eq!(binding.get(), vec![1, 2]);
}

#[test]
fn rebind_never_shows_old_value() {
    let slots = service();
    slots.write("revenue-desk-main-units", &16u32).unwrap();

    let mut binding = SlotBinding::new(slots.clone(), "revenue-desk-main-units", || 0u32);
    assert_eq!(binding.get(), 16);

    binding.rebind("revenue-desk-annex-units");
    assert_eq!(binding.get(), 0);
    assert_eq!(binding.key(), "revenue-desk-annex-units");

    // Writes to the old key no longer reach the binding.
    slots.write("revenue-desk-main-units", &99u32).unwrap();
    assert_eq!(binding.get(), 0);

    slots.write("revenue-desk-annex-units", &4u32).unwrap();
    assert_eq!(binding.get(), 4);
}

#[test]
fn binding_resets_to_default_on_wipe() {
    let slots = service();
    let binding = SlotBinding::new(slots.clone(), "revenue-desk-year", || 2025);
    binding.set(&2030).unwrap();

    assert_eq!(slots.wipe_prefix(NS).unwrap(), 1);
    assert_eq!(binding.get(), 2025);
}

// ───────────────────────────────────────────────────────────────
// Other writers
// ───────────────────────────────────────────────────────────────

#[test]
fn storage_events_propagate_between_services() {
    let store = InMemorySlotStore::new();
    let tab_a = service_over(&store);
    let tab_b = service_over(&store);

    let binding = SlotBinding::new(tab_b.clone(), "revenue-desk-units", || 0u32);
    tab_a.write("revenue-desk-units", &12u32).unwrap();

    assert_eq!(binding.get(), 0);
    assert_eq!(tab_b.pump_storage_events(), 1);
    assert_eq!(binding.get(), 12);

    // Nothing new to see.
    assert_eq!(tab_b.pump_storage_events(), 0);
}

#[test]
fn own_writes_are_not_reported_twice() {
    let slots = service();
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let _sub = slots.subscribe("k", move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    slots.write("k", &1).unwrap();
    assert_eq!(slots.pump_storage_events(), 0);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[test]
fn cleared_store_resyncs_everything() {
    let store = InMemorySlotStore::new();
    let tab_a = service_over(&store);
    let tab_b = service_over(&store);

    let binding = SlotBinding::new(tab_b.clone(), "revenue-desk-units", || 0u32);
    tab_a.write("revenue-desk-units", &8u32).unwrap();
    tab_b.pump_storage_events();
    assert_eq!(binding.get(), 8);

    store.clear().unwrap();
    tab_b.pump_storage_events();
    assert_eq!(binding.get(), 0);
}

// ───────────────────────────────────────────────────────────────
// Snapshots
// ───────────────────────────────────────────────────────────────

#[test]
fn export_covers_namespace_only() {
    let store = InMemorySlotStore::new();
    let slots = service_over(&store);
    slots.write("revenue-desk-year", &2025).unwrap();
    slots.write("other-app-key", &1).unwrap();
    store.set("revenue-desk-broken", "{oops").unwrap();

    let snapshot = slots.export_snapshot().unwrap();
    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot.get("revenue-desk-year"), Some(&json!(2025)));
    assert_eq!(snapshot.get("revenue-desk-broken"), Some(&json!("{oops")));
}

#[test]
fn restore_overwrites_and_reloads_bindings() {
    let slots = service();
    let binding = SlotBinding::new(slots.clone(), "revenue-desk-year", || 2025);
    binding.set(&2026).unwrap();

    let mut backup = StoreSnapshot::new();
    backup.insert("revenue-desk-year", json!(2019));
    backup.insert("foreign-key", json!("ignored"));

    assert_eq!(slots.restore_snapshot(&backup).unwrap(), 1);
    assert_eq!(binding.get(), 2019);
    assert_eq!(slots.read("foreign-key", String::new()), "");
}

#[test]
fn apply_remote_skips_identical_values() {
    let slots = service();
    slots.write("revenue-desk-a", &json!([1, 2, 3])).unwrap();

    let mut remote = StoreSnapshot::new();
    remote.insert("revenue-desk-a", json!([1, 2, 3]));
    remote.insert("revenue-desk-b", json!({"x": 1}));

    assert_eq!(slots.apply_remote_snapshot(&remote).unwrap(), 1);
}

proptest! {
    #[test]
    fn write_then_read_returns_written_value(
        value in proptest::collection::vec(-1.0e9f64..1.0e9, 0..12),
        default in proptest::collection::vec(-1.0e9f64..1.0e9, 0..12),
    ) {
        let slots = service();
        slots.write("revenue-desk-series", &value).unwrap();
        let back: Vec<f64> = slots.read("revenue-desk-series", default);
        prop_assert_eq!(back, value);
    }

    #[test]
    fn rebound_binding_reports_new_key_value(a in any::<u32>(), b in proptest::option::of(any::<u32>())) {
        let slots = service();
        slots.write("revenue-desk-k1", &a).unwrap();
        if let Some(b) = b {
            slots.write("revenue-desk-k2", &b).unwrap();
        }

        let mut binding = SlotBinding::new(slots.clone(), "revenue-desk-k1", || 0u32);
        binding.rebind("revenue-desk-k2");
        prop_assert_eq!(binding.get(), b.unwrap_or(0));
    }
}
