//! The five-metric shape shared by forecasts, actuals and snapshots.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{safe_div, MonthlySeries, SeriesWithTotal};

/// Revenue, nights, occupancy %, ADR and RevPAR as display rows.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSeries {
    pub revenue: SeriesWithTotal,
    pub nights: SeriesWithTotal,
    pub occupancy_pct: SeriesWithTotal,
    pub adr: SeriesWithTotal,
    pub revpar: SeriesWithTotal,
}

impl PerformanceSeries {
    /// Derives the rate metrics from monthly revenue, sold nights and
    /// available nights. Totals are weighted by the yearly sums.
    pub fn from_counts(
        revenue: MonthlySeries,
        sold_nights: MonthlySeries,
        available_nights: MonthlySeries,
    ) -> Self {
        let total_revenue = revenue.sum();
        let total_sold = sold_nights.sum();
        let total_available = available_nights.sum();

        let occupancy = sold_nights.zip_with(&available_nights, |sold, avail| {
            safe_div(sold, avail) * 100.0
        });
        let adr = revenue.zip_with(&sold_nights, safe_div);
        let revpar = revenue.zip_with(&available_nights, safe_div);

        Self {
            revenue: SeriesWithTotal::summed(revenue),
            nights: SeriesWithTotal::summed(sold_nights),
            occupancy_pct: SeriesWithTotal::with_total(
                occupancy,
                safe_div(total_sold, total_available) * 100.0,
            ),
            adr: SeriesWithTotal::with_total(adr, safe_div(total_revenue, total_sold)),
            revpar: SeriesWithTotal::with_total(revpar, safe_div(total_revenue, total_available)),
        }
    }

    /// Every value in every row, totals included.
    pub fn all_values(&self) -> impl Iterator<Item = f64> {
        [
            self.revenue,
            self.nights,
            self.occupancy_pct,
            self.adr,
            self.revpar,
        ]
        .into_iter()
        .flat_map(|series| series.to_row())
    }
}
