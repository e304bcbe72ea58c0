//! Workspace - the slots of one property portfolio wired to the engines.
//!
//! Plans, apartments, bookings and actuals are scoped to a workspace and
//! live under `{namespace}{workspace}-{slot}`. Costs, competitors and the
//! pressure table are shared by every workspace (`{namespace}{slot}`).
//!
//! ```ignore
//! let mut desk = Workspace::open(slots.clone(), "seaside");
//! desk.edit_assumption(PlanKind::Forecast, AssumptionField::Adr, Month::July, "120", "Event week")?;
//! let summary = desk.cost_summary();
//!
//! desk.switch_workspace("old-town");   // every scoped binding re-resolves
//! ```

use std::sync::Arc;

use super::slots::{SlotBinding, SlotError, SlotService};
use crate::domain::costs::{analyze_apartment, ApartmentBottomRate, ApartmentCostProfile, CostBook, CostSummary};
use crate::domain::foundation::{
    parse_decimal, parse_unit_count, DomainError, Month, Timestamp, ValidationError,
};
use crate::domain::metrics::{
    compute_actuals_from_bookings, month_summary, ActualResultSet, Apartment, AssumptionField,
    BookingCalendar, LogEntry, MetricsResultSet, MonthSummary, MonthVariance, PlanEdit, PlanKind,
    PlanWorksheet,
};
use crate::domain::monitoring::{ActualSnapshot, MonitoringReport};
use crate::domain::pricing::{daily_forecast, CompetitorBook, DailyForecast, PressureTable, RateStrategy};

/// Key prefix shared by every slot.
pub const DEFAULT_NAMESPACE: &str = "revenue-desk-";

/// Workspace opened when none is configured.
pub const DEFAULT_WORKSPACE: &str = "main";

/// Apartments seeded into a fresh workspace.
pub const DEFAULT_APARTMENT_COUNT: u32 = 16;

mod slot {
    pub const FORECAST: &str = "forecast";
    pub const BUDGET: &str = "budget";
    pub const APARTMENTS: &str = "apartments";
    pub const CURRENT_YEAR: &str = "current-year";
    pub const CELL_DATA: &str = "cell-data";
    pub const ACTUAL_DATA: &str = "actual-data";
    pub const SAVED_ACTUAL: &str = "saved-actual";
    /// Followed by `-{YYYY-MM}`.
    pub const RATE_STRATEGY: &str = "rate-strategy";

    pub const COSTS: &str = "costs";
    pub const APARTMENT_COSTS: &str = "apartment-costs";
    pub const COMPETITORS: &str = "competitors";
    pub const PRESSURE_TABLE: &str = "pressure-table";
}

/// Errors from workspace operations.
#[derive(Debug, thiserror::Error)]
pub enum WorkspaceError {
    #[error(transparent)]
    Slot(#[from] SlotError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

fn default_apartments() -> Vec<Apartment> {
    (1..=DEFAULT_APARTMENT_COUNT)
        .map(|n| Apartment::new(n, format!("Apartment {}", n)))
        .collect()
}

/// Typed access to every slot of the active workspace.
pub struct Workspace {
    slots: Arc<SlotService>,
    name: String,

    forecast: SlotBinding<PlanWorksheet>,
    budget: SlotBinding<PlanWorksheet>,
    apartments: SlotBinding<Vec<Apartment>>,
    current_year: SlotBinding<i32>,
    bookings: SlotBinding<BookingCalendar>,
    actuals: SlotBinding<Option<ActualResultSet>>,
    saved_actual: SlotBinding<Option<ActualSnapshot>>,

    costs: SlotBinding<CostBook>,
    apartment_costs: SlotBinding<Vec<ApartmentCostProfile>>,
    competitors: SlotBinding<CompetitorBook>,
    pressure: SlotBinding<PressureTable>,
}

impl Workspace {
    /// Binds every slot of `name`.
    pub fn open(slots: Arc<SlotService>, name: impl Into<String>) -> Self {
        let name = name.into();
        let scoped = |suffix: &str| scoped_key(&slots, &name, suffix);

        let forecast = SlotBinding::new(slots.clone(), scoped(slot::FORECAST), || {
            PlanWorksheet::new(PlanKind::Forecast, DEFAULT_APARTMENT_COUNT)
        });
        let budget = SlotBinding::new(slots.clone(), scoped(slot::BUDGET), || {
            PlanWorksheet::new(PlanKind::Budget, 0)
        });
        let apartments =
            SlotBinding::new(slots.clone(), scoped(slot::APARTMENTS), default_apartments);
        let current_year = SlotBinding::new(slots.clone(), scoped(slot::CURRENT_YEAR), || {
            Timestamp::now().year()
        });
        let bookings =
            SlotBinding::new(slots.clone(), scoped(slot::CELL_DATA), BookingCalendar::new);
        let actuals = SlotBinding::new(slots.clone(), scoped(slot::ACTUAL_DATA), || None);
        let saved_actual = SlotBinding::new(slots.clone(), scoped(slot::SAVED_ACTUAL), || None);

        let costs = SlotBinding::new(slots.clone(), slots.key(slot::COSTS), CostBook::default);
        let apartment_costs =
            SlotBinding::new(slots.clone(), slots.key(slot::APARTMENT_COSTS), Vec::new);
        let competitors = SlotBinding::new(
            slots.clone(),
            slots.key(slot::COMPETITORS),
            CompetitorBook::default,
        );
        let pressure = SlotBinding::new(
            slots.clone(),
            slots.key(slot::PRESSURE_TABLE),
            PressureTable::default,
        );

        tracing::debug!(workspace = %name, "Workspace opened");

        Self {
            slots,
            name,
            forecast,
            budget,
            apartments,
            current_year,
            bookings,
            actuals,
            saved_actual,
            costs,
            apartment_costs,
            competitors,
            pressure,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Points every scoped binding at another workspace.
    pub fn switch_workspace(&mut self, name: impl Into<String>) {
        let name = name.into();
        if name == self.name {
            return;
        }
        let key = |suffix: &str| scoped_key(&self.slots, &name, suffix);

        self.forecast.rebind(key(slot::FORECAST));
        self.budget.rebind(key(slot::BUDGET));
        self.apartments.rebind(key(slot::APARTMENTS));
        self.current_year.rebind(key(slot::CURRENT_YEAR));
        self.bookings.rebind(key(slot::CELL_DATA));
        self.actuals.rebind(key(slot::ACTUAL_DATA));
        self.saved_actual.rebind(key(slot::SAVED_ACTUAL));

        tracing::info!(from = %self.name, to = %name, "Switched workspace");
        self.name = name;
    }

    // === Calendar and apartments ===

    pub fn year(&self) -> i32 {
        self.current_year.get()
    }

    pub fn set_year(&self, year: i32) -> Result<(), WorkspaceError> {
        Ok(self.current_year.set(&year)?)
    }

    pub fn apartments(&self) -> Vec<Apartment> {
        self.apartments.get()
    }

    pub fn set_apartments(&self, apartments: Vec<Apartment>) -> Result<(), WorkspaceError> {
        Ok(self.apartments.set(&apartments)?)
    }

    // === Plans ===

    fn plan(&self, kind: PlanKind) -> &SlotBinding<PlanWorksheet> {
        match kind {
            PlanKind::Forecast => &self.forecast,
            PlanKind::Budget => &self.budget,
        }
    }

    pub fn worksheet(&self, kind: PlanKind) -> PlanWorksheet {
        self.plan(kind).get()
    }

    /// Metrics for the plan in the current year.
    pub fn metrics(&self, kind: PlanKind) -> MetricsResultSet {
        self.worksheet(kind).metrics(self.year())
    }

    /// Applies an edit to a plan and persists it when it changed something.
    pub fn apply_edit(
        &self,
        kind: PlanKind,
        edit: PlanEdit,
        comment: &str,
    ) -> Result<Option<LogEntry>, WorkspaceError> {
        let binding = self.plan(kind);
        let mut sheet = binding.get();
        let entry = sheet.apply(edit, comment)?;
        if entry.is_some() {
            binding.set(&sheet)?;
        }
        Ok(entry)
    }

    /// Edits an assumption from raw user input (`"1,5"`, `"€ 60"`, ...).
    pub fn edit_assumption(
        &self,
        kind: PlanKind,
        field: AssumptionField,
        month: Month,
        input: &str,
        comment: &str,
    ) -> Result<Option<LogEntry>, WorkspaceError> {
        let edit = PlanEdit::Assumption {
            field,
            month,
            value: parse_decimal(input),
        };
        self.apply_edit(kind, edit, comment)
    }

    /// Edits a unit count from raw input; invalid input keeps the old count.
    pub fn edit_units(
        &self,
        kind: PlanKind,
        month: Month,
        input: &str,
        comment: &str,
    ) -> Result<Option<LogEntry>, WorkspaceError> {
        let current = self.worksheet(kind).units.get(month);
        let edit = PlanEdit::Units {
            month,
            count: parse_unit_count(input, current),
        };
        self.apply_edit(kind, edit, comment)
    }

    pub fn set_plan_locked(&self, kind: PlanKind, locked: bool) -> Result<(), WorkspaceError> {
        let binding = self.plan(kind);
        let mut sheet = binding.get();
        sheet.set_locked(locked);
        Ok(binding.set(&sheet)?)
    }

    // === Bookings and actuals ===

    pub fn bookings(&self) -> BookingCalendar {
        self.bookings.get()
    }

    pub fn update_bookings(
        &self,
        f: impl FnOnce(BookingCalendar) -> BookingCalendar,
    ) -> Result<(), WorkspaceError> {
        self.bookings.update(f)?;
        Ok(())
    }

    /// Recomputes actuals from the booking grid and stores them.
    pub fn refresh_actuals(&self) -> Result<ActualResultSet, WorkspaceError> {
        let actuals =
            compute_actuals_from_bookings(&self.bookings(), &self.apartments(), self.year());
        self.actuals.set(&Some(actuals.clone()))?;
        Ok(actuals)
    }

    /// Last computed actuals, if any.
    pub fn actuals(&self) -> Option<ActualResultSet> {
        self.actuals.get()
    }

    /// Captures current actuals as the "as of" snapshot, replacing the previous one.
    pub fn save_snapshot(&self) -> Result<ActualSnapshot, WorkspaceError> {
        let actuals = self.refresh_actuals()?;
        let snapshot = ActualSnapshot::capture(actuals.performance);
        self.saved_actual.set(&Some(snapshot.clone()))?;
        tracing::info!(workspace = %self.name, heading = %snapshot.heading(), "Snapshot saved");
        Ok(snapshot)
    }

    pub fn saved_snapshot(&self) -> Option<ActualSnapshot> {
        self.saved_actual.get()
    }

    /// On-the-books summary of one month of the current year.
    pub fn month_summary(&self, month: Month) -> MonthSummary {
        month_summary(&self.bookings(), &self.apartments(), self.year(), month)
    }

    /// The month's books against its budget.
    pub fn month_budget_variance(&self, month: Month) -> MonthVariance {
        let budget = self.metrics(PlanKind::Budget);
        self.month_summary(month).budget_variance(budget.month(month))
    }

    /// Forecast, budget, actuals and snapshot side by side.
    pub fn monitoring_report(&self) -> MonitoringReport {
        let forecast = self.metrics(PlanKind::Forecast);
        let budget = self.metrics(PlanKind::Budget);
        let actual = self.actuals().map(|a| a.performance);
        let snapshot = self.saved_snapshot();
        MonitoringReport::build(&forecast, Some(&budget), actual.as_ref(), snapshot.as_ref())
    }

    // === Costs ===

    pub fn costs(&self) -> CostBook {
        self.costs.get()
    }

    /// Edits the cost book; nothing is persisted when `f` fails.
    pub fn edit_costs<R>(
        &self,
        f: impl FnOnce(&mut CostBook) -> Result<R, DomainError>,
    ) -> Result<R, WorkspaceError> {
        let mut book = self.costs.get();
        let out = f(&mut book)?;
        self.costs.set(&book)?;
        Ok(out)
    }

    /// Costs against forecast revenue and nights.
    pub fn cost_summary(&self) -> CostSummary {
        CostSummary::for_metrics(&self.costs(), &self.metrics(PlanKind::Forecast))
    }

    pub fn apartment_costs(&self) -> Vec<ApartmentCostProfile> {
        self.apartment_costs.get()
    }

    pub fn set_apartment_costs(
        &self,
        profiles: Vec<ApartmentCostProfile>,
    ) -> Result<(), WorkspaceError> {
        Ok(self.apartment_costs.set(&profiles)?)
    }

    pub fn apartment_bottom_rates(&self) -> Vec<ApartmentBottomRate> {
        self.apartment_costs().iter().map(analyze_apartment).collect()
    }

    // === Pricing ===

    pub fn competitors(&self) -> CompetitorBook {
        self.competitors.get()
    }

    pub fn edit_competitors<R>(
        &self,
        f: impl FnOnce(&mut CompetitorBook) -> Result<R, DomainError>,
    ) -> Result<R, WorkspaceError> {
        let mut book = self.competitors.get();
        let out = f(&mut book)?;
        self.competitors.set(&book)?;
        Ok(out)
    }

    pub fn pressure_table(&self) -> PressureTable {
        self.pressure.get()
    }

    fn rate_strategy_key(&self, month: Month) -> String {
        let suffix = format!(
            "{}-{}",
            slot::RATE_STRATEGY,
            BookingCalendar::month_key(self.year(), month)
        );
        scoped_key(&self.slots, &self.name, &suffix)
    }

    /// Rate strategy for a month of the current year; empty when none is saved.
    pub fn rate_strategy(&self, month: Month) -> RateStrategy {
        let year = self.year();
        self.slots.read_or_else(&self.rate_strategy_key(month), || {
            RateStrategy::for_month(year, month)
        })
    }

    pub fn set_rate_strategy(
        &self,
        month: Month,
        strategy: &RateStrategy,
    ) -> Result<(), WorkspaceError> {
        Ok(self.slots.write(&self.rate_strategy_key(month), strategy)?)
    }

    pub fn daily_forecast(&self, month: Month) -> DailyForecast {
        daily_forecast(&self.rate_strategy(month), &self.apartments(), self.year(), month)
    }

    pub fn edit_pressure_table<R>(
        &self,
        f: impl FnOnce(&mut PressureTable) -> Result<R, ValidationError>,
    ) -> Result<R, WorkspaceError> {
        let mut table = self.pressure.get();
        let out = f(&mut table)?;
        self.pressure.set(&table)?;
        Ok(out)
    }
}

fn scoped_key(slots: &SlotService, workspace: &str, suffix: &str) -> String {
    slots.key(&format!("{}-{}", workspace, suffix))
}
