//! Element-wise variance between two display rows.

use crate::domain::foundation::SeriesWithTotal;
use crate::domain::metrics::PerformanceSeries;

/// `comparison − baseline` at every position, the total included.
///
/// Percentage rows are subtracted as-is; nothing is re-normalized.
pub fn variance(baseline: &SeriesWithTotal, comparison: &SeriesWithTotal) -> SeriesWithTotal {
    comparison.zip_with(baseline, |b, a| b - a)
}

impl PerformanceSeries {
    /// Variance of `self` against `baseline` for all five metrics.
    pub fn variance_against(&self, baseline: &PerformanceSeries) -> PerformanceSeries {
        PerformanceSeries {
            revenue: variance(&baseline.revenue, &self.revenue),
            nights: variance(&baseline.nights, &self.nights),
            occupancy_pct: variance(&baseline.occupancy_pct, &self.occupancy_pct),
            adr: variance(&baseline.adr, &self.adr),
            revpar: variance(&baseline.revpar, &self.revpar),
        }
    }
}
