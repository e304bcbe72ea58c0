//! Metrics module - forecast/budget derivations and actual performance.

mod actuals;
mod assumptions;
mod engine;
mod performance;

pub use actuals::{
    compute_actuals_from_bookings, month_summary, ActualResultSet, Apartment, BookingCalendar,
    BookingCell, MonthSummary, MonthVariance, OnTheBooks, BLOCKED_PRICE,
};
pub use assumptions::{
    AssumptionField, AssumptionSet, LogEntry, PlanEdit, PlanKind, PlanWorksheet, UnitCounts,
};
pub use engine::{compute_monthly_metrics, MetricsResultSet, MetricsTotals, MonthMetrics};
pub use performance::PerformanceSeries;
