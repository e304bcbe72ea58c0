//! Monitoring module - variances between plans, actuals and saved snapshots.

mod report;
mod snapshot;
mod variance;

pub use report::{ForecastOverview, MonitoringReport};
pub use snapshot::ActualSnapshot;
pub use variance::variance;
