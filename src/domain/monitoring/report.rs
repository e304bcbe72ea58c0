//! Monitoring report - forecast, budget, actual and snapshot side by side.

use serde::{Deserialize, Serialize};

use super::snapshot::ActualSnapshot;
use super::variance::variance;
use crate::domain::foundation::SeriesWithTotal;
use crate::domain::metrics::{MetricsResultSet, PerformanceSeries};

/// Forecast panorama rows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastOverview {
    pub potential_nights: SeriesWithTotal,
    pub occupancy_pct: SeriesWithTotal,
    pub sold_nights: SeriesWithTotal,
    pub adr: SeriesWithTotal,
    pub revpar: SeriesWithTotal,
    pub revenue: SeriesWithTotal,
}

impl ForecastOverview {
    fn from_metrics(metrics: &MetricsResultSet) -> Self {
        Self {
            potential_nights: metrics.potential_nights(),
            occupancy_pct: metrics.occupancy_pct(),
            sold_nights: metrics.sold_nights(),
            adr: metrics.adr(),
            revpar: metrics.revpar(),
            revenue: metrics.revenue(),
        }
    }
}

/// Every monitoring section. Sections whose inputs are missing are `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitoringReport {
    pub forecast: ForecastOverview,
    pub budget_revenue: Option<SeriesWithTotal>,
    pub actual: Option<PerformanceSeries>,
    pub actual_vs_forecast: Option<PerformanceSeries>,
    pub actual_vs_budget_revenue: Option<SeriesWithTotal>,
    pub snapshot: Option<ActualSnapshot>,
    pub actual_vs_snapshot: Option<PerformanceSeries>,
    pub prior_year_revenue: SeriesWithTotal,
    pub actual_vs_prior_year_revenue: Option<SeriesWithTotal>,
}

impl MonitoringReport {
    pub fn build(
        forecast: &MetricsResultSet,
        budget: Option<&MetricsResultSet>,
        actual: Option<&PerformanceSeries>,
        snapshot: Option<&ActualSnapshot>,
    ) -> Self {
        let forecast_perf = forecast.performance();
        let budget_revenue = budget.map(MetricsResultSet::revenue);
        let prior_year_revenue = forecast.prior_year_revenue();

        Self {
            forecast: ForecastOverview::from_metrics(forecast),
            actual: actual.copied(),
            actual_vs_forecast: actual.map(|a| a.variance_against(&forecast_perf)),
            actual_vs_budget_revenue: actual
                .zip(budget_revenue.as_ref())
                .map(|(a, b)| variance(b, &a.revenue)),
            budget_revenue,
            snapshot: snapshot.cloned(),
            actual_vs_snapshot: actual
                .zip(snapshot)
                .map(|(a, s)| a.variance_against(&s.data)),
            actual_vs_prior_year_revenue: actual.map(|a| variance(&prior_year_revenue, &a.revenue)),
            prior_year_revenue,
        }
    }
}
