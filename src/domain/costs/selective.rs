//! Per-apartment cost analysis and break-even rate.

use serde::{Deserialize, Serialize};

use super::items::{FixedCost, VariableCost};
use crate::domain::foundation::{safe_div, ApartmentId, Month, MonthlySeries, SeriesWithTotal, MONTHS_PER_YEAR};

/// Costs attributed to a single apartment, with the nights it is open.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApartmentCostProfile {
    pub apartment: ApartmentId,
    pub name: String,
    #[serde(default)]
    pub fixed: Vec<FixedCost>,
    #[serde(default)]
    pub variable: Vec<VariableCost>,
    #[serde(default)]
    pub open_nights: [u32; MONTHS_PER_YEAR],
}

impl ApartmentCostProfile {
    pub fn new(apartment: ApartmentId, name: impl Into<String>) -> Self {
        Self {
            apartment,
            name: name.into(),
            fixed: Vec::new(),
            variable: Vec::new(),
            open_nights: [0; MONTHS_PER_YEAR],
        }
    }

    pub fn set_open_nights(&mut self, month: Month, nights: u32) {
        self.open_nights[month.index()] = nights;
    }
}

/// Break-even view for one apartment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApartmentBottomRate {
    pub apartment: ApartmentId,
    pub name: String,
    pub cost: SeriesWithTotal,
    pub open_nights: SeriesWithTotal,
    pub bottom_rate: SeriesWithTotal,
}

/// Monthly and annual break-even rate for one apartment.
///
/// Percentage-of-revenue items contribute nothing here: an apartment on its
/// own has no revenue basis to apply them to.
pub fn analyze_apartment(profile: &ApartmentCostProfile) -> ApartmentBottomRate {
    let no_revenue = MonthlySeries::zeros();
    let fixed_per_month: f64 = profile.fixed.iter().map(FixedCost::monthly_amount).sum();

    let cost_months = profile
        .variable
        .iter()
        .fold(MonthlySeries::filled(fixed_per_month), |acc, item| {
            acc.zip_with(&item.monthly_cost(&no_revenue), |a, b| a + b)
        });
    let cost = SeriesWithTotal::summed(cost_months);

    let open_nights = SeriesWithTotal::summed(MonthlySeries::from_fn(|m| {
        f64::from(profile.open_nights[m.index()])
    }));

    ApartmentBottomRate {
        apartment: profile.apartment,
        name: profile.name.clone(),
        bottom_rate: cost.zip_with(&open_nights, safe_div),
        cost,
        open_nights,
    }
}
