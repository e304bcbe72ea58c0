//! A workspace over file-backed slots: persistence, backups and sharing.

use std::sync::Arc;

use revenue_desk::adapters::storage::{FileSlotStore, InMemorySlotStore};
use revenue_desk::application::{SlotService, Workspace, DEFAULT_NAMESPACE, DEFAULT_WORKSPACE};
use revenue_desk::domain::foundation::{Month, StoreSnapshot};
use revenue_desk::domain::metrics::{AssumptionField, PlanKind};
use revenue_desk::domain::pricing::PressureLevel;

fn file_workspace(dir: &tempfile::TempDir) -> (Arc<SlotService>, Workspace) {
    let store = FileSlotStore::open(dir.path().join("slots.json")).unwrap();
    let slots = Arc::new(SlotService::new(Arc::new(store), DEFAULT_NAMESPACE));
    let ws = Workspace::open(slots.clone(), DEFAULT_WORKSPACE);
    (slots, ws)
}

#[test]
fn plan_edits_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    {
        let (_, ws) = file_workspace(&dir);
        ws.set_year(2025).unwrap();
        ws.edit_assumption(
            PlanKind::Forecast,
            AssumptionField::Adr,
            Month::August,
            "135",
            "Festival",
        )
        .unwrap();
    }

    let (_, ws) = file_workspace(&dir);
    let sheet = ws.worksheet(PlanKind::Forecast);
    assert_eq!(sheet.assumptions.get(AssumptionField::Adr, Month::August), 135.0);
    assert_eq!(sheet.log().len(), 1);
    assert_eq!(ws.year(), 2025);
}

#[test]
fn backup_restores_into_fresh_store() {
    let dir = tempfile::tempdir().unwrap();
    let (slots, ws) = file_workspace(&dir);
    ws.set_year(2024).unwrap();
    ws.edit_pressure_table(|t| Ok(t.set_bars(7))).unwrap();

    let backup = slots.export_snapshot().unwrap();
    let raw = backup.to_json_pretty();

    let fresh = Arc::new(SlotService::new(
        Arc::new(InMemorySlotStore::new()),
        DEFAULT_NAMESPACE,
    ));
    let restored_ws = Workspace::open(fresh.clone(), DEFAULT_WORKSPACE);
    assert_ne!(restored_ws.pressure_table().bars(), 7);

    let parsed = StoreSnapshot::from_json(&raw).unwrap();
    assert_eq!(fresh.restore_snapshot(&parsed).unwrap(), backup.len());

    assert_eq!(restored_ws.year(), 2024);
    assert_eq!(
        restored_ws.pressure_table().ladder(PressureLevel::Low).bars.len(),
        7
    );
}

#[test]
fn workspaces_share_global_slots_only() {
    let dir = tempfile::tempdir().unwrap();
    let (slots, main) = file_workspace(&dir);
    main.set_year(2030).unwrap();
    main.edit_pressure_table(|t| {
        t.set_base_rate(PressureLevel::High, 180.0);
        Ok(())
    })
    .unwrap();

    let annex = Workspace::open(slots, "annex");
    assert_ne!(annex.year(), 2030);
    assert_eq!(annex.pressure_table().base_rates().high, 180.0);
}

#[test]
fn monitoring_report_without_actuals_compares_plans() {
    let dir = tempfile::tempdir().unwrap();
    let (_, ws) = file_workspace(&dir);
    ws.set_year(2025).unwrap();

    let report = ws.monitoring_report();
    assert!(report.actual.is_none());
    assert!(report.actual_vs_snapshot.is_none());
}
