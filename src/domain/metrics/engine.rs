//! Revenue Metrics Engine - monthly nights, revenue and RevPAR from assumptions.

use serde::{Deserialize, Serialize};

use super::assumptions::{AssumptionSet, PlanWorksheet, UnitCounts};
use super::performance::PerformanceSeries;
use crate::domain::foundation::{
    days_in_month, finite_or_zero, safe_div, Month, MonthlySeries, SeriesWithTotal,
    MONTHS_PER_YEAR,
};

/// Derived figures for one month.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthMetrics {
    pub month: Month,
    pub days: u32,
    pub units: u32,
    pub occupancy_pct: f64,
    pub adr: f64,
    pub potential_nights: f64,
    pub sold_nights: f64,
    pub revenue: f64,
    pub revpar: f64,
    pub revpar_index: f64,
    pub prior_year_revenue: f64,
}

/// Yearly aggregates. Rate-like totals are weighted, never averaged.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsTotals {
    pub potential_nights: f64,
    pub sold_nights: f64,
    pub revenue: f64,
    pub occupancy_pct: f64,
    pub adr: f64,
    pub revpar: f64,
    pub revpar_index: f64,
    pub prior_year_revenue: f64,
}

/// Output of [`compute_monthly_metrics`]. Always recomputed, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsResultSet {
    pub year: i32,
    pub months: [MonthMetrics; MONTHS_PER_YEAR],
    pub totals: MetricsTotals,
}

/// Computes per-month and yearly metrics for one plan.
///
/// Non-finite assumptions are read as zero, and every ratio with a zero
/// denominator is zero, so the result never contains NaN or infinity.
pub fn compute_monthly_metrics(
    assumptions: &AssumptionSet,
    units: &UnitCounts,
    year: i32,
) -> MetricsResultSet {
    let months = Month::ALL.map(|month| {
        let days = days_in_month(month, year);
        let unit_count = units.get(month);
        let occupancy_pct = finite_or_zero(assumptions.occupancy_pct.get(month));
        let adr = finite_or_zero(assumptions.adr.get(month));

        let potential_nights = f64::from(unit_count) * f64::from(days);
        let sold_nights = potential_nights * (occupancy_pct / 100.0);
        let revenue = sold_nights * adr;
        let revpar = safe_div(revenue, potential_nights);

        MonthMetrics {
            month,
            days,
            units: unit_count,
            occupancy_pct,
            adr,
            potential_nights,
            sold_nights,
            revenue,
            revpar,
            revpar_index: safe_div(adr, revpar),
            prior_year_revenue: finite_or_zero(assumptions.prior_year_revenue.get(month)),
        }
    });

    let sum = |f: fn(&MonthMetrics) -> f64| MonthlySeries::from_fn(|m| f(&months[m.index()])).sum();
    let potential_nights = sum(|m| m.potential_nights);
    let sold_nights = sum(|m| m.sold_nights);
    let revenue = sum(|m| m.revenue);
    let revpar = safe_div(revenue, potential_nights);
    let adr = safe_div(revenue, sold_nights);
    let prior_year_revenue = sum(|m| m.prior_year_revenue);

    MetricsResultSet {
        year,
        months,
        totals: MetricsTotals {
            potential_nights,
            sold_nights,
            revenue,
            occupancy_pct: safe_div(sold_nights, potential_nights) * 100.0,
            adr,
            revpar,
            revpar_index: safe_div(adr, revpar),
            prior_year_revenue,
        },
    }
}

impl MetricsResultSet {
    fn column(&self, f: impl Fn(&MonthMetrics) -> f64) -> MonthlySeries {
        MonthlySeries::from_fn(|m| f(&self.months[m.index()]))
    }

    pub fn month(&self, month: Month) -> &MonthMetrics {
        &self.months[month.index()]
    }

    pub fn potential_nights(&self) -> SeriesWithTotal {
        SeriesWithTotal::with_total(self.column(|m| m.potential_nights), self.totals.potential_nights)
    }

    pub fn sold_nights(&self) -> SeriesWithTotal {
        SeriesWithTotal::with_total(self.column(|m| m.sold_nights), self.totals.sold_nights)
    }

    pub fn revenue(&self) -> SeriesWithTotal {
        SeriesWithTotal::with_total(self.column(|m| m.revenue), self.totals.revenue)
    }

    pub fn occupancy_pct(&self) -> SeriesWithTotal {
        SeriesWithTotal::with_total(self.column(|m| m.occupancy_pct), self.totals.occupancy_pct)
    }

    pub fn adr(&self) -> SeriesWithTotal {
        SeriesWithTotal::with_total(self.column(|m| m.adr), self.totals.adr)
    }

    pub fn revpar(&self) -> SeriesWithTotal {
        SeriesWithTotal::with_total(self.column(|m| m.revpar), self.totals.revpar)
    }

    pub fn revpar_index(&self) -> SeriesWithTotal {
        SeriesWithTotal::with_total(self.column(|m| m.revpar_index), self.totals.revpar_index)
    }

    pub fn prior_year_revenue(&self) -> SeriesWithTotal {
        SeriesWithTotal::with_total(
            self.column(|m| m.prior_year_revenue),
            self.totals.prior_year_revenue,
        )
    }

    /// The five-metric view used for variance against actuals.
    pub fn performance(&self) -> PerformanceSeries {
        PerformanceSeries {
            revenue: self.revenue(),
            nights: self.sold_nights(),
            occupancy_pct: self.occupancy_pct(),
            adr: self.adr(),
            revpar: self.revpar(),
        }
    }
}

impl PlanWorksheet {
    /// Metrics for this worksheet's assumptions and units.
    pub fn metrics(&self, year: i32) -> MetricsResultSet {
        compute_monthly_metrics(&self.assumptions, &self.units, year)
    }
}

#[cfg(test)]
#[path = "engine_test.rs"]
mod tests;
