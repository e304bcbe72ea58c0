//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (months, series, ids, formatting, errors)
//! - `metrics` - Forecast/budget derivations and actuals from bookings
//! - `costs` - Cost lines, allocation against revenue, break-even rates
//! - `monitoring` - Variances between plans, actuals and saved snapshots
//! - `pricing` - Pressure-level rate ladders and competitor rates

pub mod costs;
pub mod foundation;
pub mod metrics;
pub mod monitoring;
pub mod pricing;
