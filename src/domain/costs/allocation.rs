//! Cost Allocation Engine - monthly costs, margin and unit economics.

use serde::{Deserialize, Serialize};

use super::items::{CostBook, FixedCost, VariableCost};
use crate::domain::foundation::{safe_div, CostItemId, MonthlySeries, SeriesWithTotal};
use crate::domain::metrics::MetricsResultSet;

/// Nights the per-night ratios divide by.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NightBasis {
    pub available: SeriesWithTotal,
    pub sold: SeriesWithTotal,
}

impl NightBasis {
    pub fn from_metrics(metrics: &MetricsResultSet) -> Self {
        Self {
            available: metrics.potential_nights(),
            sold: metrics.sold_nights(),
        }
    }
}

/// One variable item's monthly allocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableCostLine {
    pub id: CostItemId,
    pub name: String,
    pub cost: SeriesWithTotal,
}

/// Allocated costs with margin and per-night figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostSummary {
    pub revenue: SeriesWithTotal,
    pub fixed: SeriesWithTotal,
    pub variable: SeriesWithTotal,
    pub variable_lines: Vec<VariableCostLine>,
    pub total_cost: SeriesWithTotal,
    pub margin: SeriesWithTotal,
    pub margin_pct: SeriesWithTotal,
    /// Fixed cost over available nights.
    pub cost_per_available_night: SeriesWithTotal,
    /// Variable cost over sold nights.
    pub cost_per_sold_night: SeriesWithTotal,
    /// Total cost over sold nights: the lowest rate that breaks even.
    pub bottom_rate: SeriesWithTotal,
}

/// Allocates fixed and variable costs against monthly revenue.
///
/// Each per-night ratio has its own denominator: fixed cost is spread over
/// available nights, variable and total cost over sold nights. Totals
/// apply the same formulas to the yearly sums.
pub fn allocate_costs(
    fixed_items: &[FixedCost],
    variable_items: &[VariableCost],
    revenue: &SeriesWithTotal,
    nights: &NightBasis,
) -> CostSummary {
    let monthly_revenue = revenue.months().sanitized();

    let fixed_per_month: f64 = fixed_items.iter().map(FixedCost::monthly_amount).sum();
    let fixed = SeriesWithTotal::summed(MonthlySeries::filled(fixed_per_month));

    let variable_lines: Vec<VariableCostLine> = variable_items
        .iter()
        .map(|item| VariableCostLine {
            id: item.id,
            name: item.name.clone(),
            cost: SeriesWithTotal::summed(item.monthly_cost(&monthly_revenue)),
        })
        .collect();

    let variable_months = variable_lines
        .iter()
        .fold(MonthlySeries::zeros(), |acc, line| {
            acc.zip_with(line.cost.months(), |a, b| a + b)
        });
    let variable = SeriesWithTotal::summed(variable_months);

    let total_cost = SeriesWithTotal::summed(fixed.months().zip_with(variable.months(), |f, v| f + v));
    let revenue = SeriesWithTotal::summed(monthly_revenue);
    let margin = revenue.zip_with(&total_cost, |r, c| r - c);
    let margin_pct = margin.zip_with(&revenue, |m, r| {
        if r > 0.0 {
            safe_div(m, r) * 100.0
        } else {
            0.0
        }
    });

    CostSummary {
        cost_per_available_night: fixed.zip_with(&nights.available, safe_div),
        cost_per_sold_night: variable.zip_with(&nights.sold, safe_div),
        bottom_rate: total_cost.zip_with(&nights.sold, safe_div),
        revenue,
        fixed,
        variable,
        variable_lines,
        total_cost,
        margin,
        margin_pct,
    }
}

impl CostSummary {
    /// Allocates a cost book against a plan's revenue and nights.
    pub fn for_metrics(book: &CostBook, metrics: &MetricsResultSet) -> Self {
        allocate_costs(
            &book.fixed,
            &book.variable,
            &metrics.revenue(),
            &NightBasis::from_metrics(metrics),
        )
    }
}
