//! Day-by-day forecast from expected occupancy and nightly prices.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::pressure::PressureLevel;
use crate::domain::foundation::{days_in_month, finite_or_zero, safe_div, ApartmentId, Month};
use crate::domain::metrics::Apartment;

/// Which price list an apartment sells from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaseRate {
    /// Follows the shared master prices.
    Master,
    /// Uses its own per-day prices.
    #[default]
    Own,
}

/// Month-long plan of expected occupancy and prices. Every per-day vector
/// is indexed from day 1 at position 0.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RateStrategy {
    pub occupancy_pct: Vec<f64>,
    pub master_prices: Vec<f64>,
    pub apartment_prices: BTreeMap<ApartmentId, Vec<f64>>,
    pub base_rates: BTreeMap<ApartmentId, BaseRate>,
}

impl RateStrategy {
    /// Empty strategy sized to the month.
    pub fn for_month(year: i32, month: Month) -> Self {
        let days = days_in_month(month, year) as usize;
        Self {
            occupancy_pct: vec![0.0; days],
            master_prices: vec![0.0; days],
            ..Self::default()
        }
    }

    pub fn base_rate(&self, apartment: ApartmentId) -> BaseRate {
        self.base_rates.get(&apartment).copied().unwrap_or_default()
    }

    /// Price `apartment` sells at on the zero-based `day`. Missing entries are 0.
    pub fn price(&self, apartment: ApartmentId, day: usize) -> f64 {
        let list = match self.base_rate(apartment) {
            BaseRate::Master => Some(&self.master_prices),
            BaseRate::Own => self.apartment_prices.get(&apartment),
        };
        list.and_then(|prices| prices.get(day))
            .copied()
            .map(finite_or_zero)
            .unwrap_or(0.0)
    }

    fn occupancy(&self, day: usize) -> f64 {
        self.occupancy_pct
            .get(day)
            .copied()
            .map(finite_or_zero)
            .unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastDay {
    pub day: u32,
    pub occupancy_pct: f64,
    pub nights: f64,
    pub revenue: f64,
    pub pressure: PressureLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyForecast {
    pub days: Vec<ForecastDay>,
    pub total_nights: f64,
    pub total_revenue: f64,
    /// Total revenue over total nights; 0 when nothing is expected to sell.
    pub adr: f64,
    pub average_occupancy_pct: f64,
}

/// Expected nights and revenue for each day of the month.
///
/// Nights per day are `apartments × occupancy / 100`. Revenue sums each
/// apartment's price for the day weighted by the same occupancy.
pub fn daily_forecast(
    strategy: &RateStrategy,
    apartments: &[Apartment],
    year: i32,
    month: Month,
) -> DailyForecast {
    let day_count = days_in_month(month, year);
    let days: Vec<ForecastDay> = (0..day_count as usize)
        .map(|day| {
            let occupancy = strategy.occupancy(day);
            let share = occupancy / 100.0;
            let revenue: f64 = apartments
                .iter()
                .map(|apartment| strategy.price(apartment.id, day) * share)
                .sum();
            ForecastDay {
                day: day as u32 + 1,
                occupancy_pct: occupancy,
                nights: apartments.len() as f64 * share,
                revenue,
                pressure: PressureLevel::classify(occupancy),
            }
        })
        .collect();

    let total_nights: f64 = days.iter().map(|d| d.nights).sum();
    let total_revenue: f64 = days.iter().map(|d| d.revenue).sum();
    let occupancy_sum: f64 = days.iter().map(|d| d.occupancy_pct).sum();

    DailyForecast {
        total_nights,
        total_revenue,
        adr: safe_div(total_revenue, total_nights),
        average_occupancy_pct: safe_div(occupancy_sum, f64::from(day_count)),
        days,
    }
}
