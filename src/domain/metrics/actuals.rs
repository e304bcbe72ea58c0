//! Actual-Performance Aggregator - on-the-books figures from the booking grid.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::engine::MonthMetrics;
use super::performance::PerformanceSeries;
use crate::domain::foundation::{days_in_month, safe_div, ApartmentId, Month, MonthlySeries};

/// Price marking a day the unit cannot be sold.
pub const BLOCKED_PRICE: f64 = -1.0;

/// A rentable unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Apartment {
    pub id: ApartmentId,
    pub name: String,
}

impl Apartment {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id: ApartmentId::new(id),
            name: name.into(),
        }
    }
}

/// One apartment-night in the booking grid.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BookingCell {
    #[serde(default)]
    pub price: Option<f64>,
    /// Sales channel tag. Older grids call this the cell colour.
    #[serde(default, alias = "color")]
    pub channel: Option<String>,
}

impl BookingCell {
    pub fn sold(channel: impl Into<String>, price: f64) -> Self {
        Self {
            price: Some(price),
            channel: Some(channel.into()),
        }
    }

    pub fn blocked() -> Self {
        Self {
            price: Some(BLOCKED_PRICE),
            channel: None,
        }
    }

    pub fn is_blocked(&self) -> bool {
        self.price == Some(BLOCKED_PRICE)
    }

    /// Sold means a non-empty channel and a positive, finite price.
    pub fn is_sold(&self) -> bool {
        let has_channel = self
            .channel
            .as_deref()
            .map(|c| !c.trim().is_empty())
            .unwrap_or(false);
        let priced = self.price.map(|p| p.is_finite() && p > 0.0).unwrap_or(false);
        has_channel && priced
    }
}

/// Booking grid: month key (`YYYY-MM`) to cell key (`{apartment}-{day}`).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookingCalendar(BTreeMap<String, BTreeMap<String, BookingCell>>);

impl BookingCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn month_key(year: i32, month: Month) -> String {
        format!("{}-{:02}", year, month.number())
    }

    pub fn cell_key(apartment: ApartmentId, day: u32) -> String {
        format!("{}-{}", apartment, day)
    }

    pub fn set_cell(
        &mut self,
        year: i32,
        month: Month,
        apartment: ApartmentId,
        day: u32,
        cell: BookingCell,
    ) {
        self.0
            .entry(Self::month_key(year, month))
            .or_default()
            .insert(Self::cell_key(apartment, day), cell);
    }

    pub fn clear_cell(&mut self, year: i32, month: Month, apartment: ApartmentId, day: u32) {
        if let Some(cells) = self.0.get_mut(&Self::month_key(year, month)) {
            cells.remove(&Self::cell_key(apartment, day));
        }
    }

    pub fn cell(
        &self,
        year: i32,
        month: Month,
        apartment: ApartmentId,
        day: u32,
    ) -> Option<&BookingCell> {
        self.0
            .get(&Self::month_key(year, month))
            .and_then(|cells| cells.get(&Self::cell_key(apartment, day)))
    }
}

/// Output of [`compute_actuals_from_bookings`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActualResultSet {
    pub year: i32,
    pub performance: PerformanceSeries,
    pub available_nights: MonthlySeries,
    /// Informational: blocked days are already left out of sold nights and revenue.
    pub blocked_nights: MonthlySeries,
}

/// Aggregates sold nights and revenue per month from the booking grid.
///
/// Blocked days (price `-1`) never count as sold and never add revenue.
/// Occupancy and RevPAR use `apartments × days` as the denominator.
pub fn compute_actuals_from_bookings(
    calendar: &BookingCalendar,
    apartments: &[Apartment],
    year: i32,
) -> ActualResultSet {
    let mut revenue = MonthlySeries::zeros();
    let mut sold = MonthlySeries::zeros();
    let mut blocked = MonthlySeries::zeros();
    let mut available = MonthlySeries::zeros();

    for month in Month::ALL {
        let days = days_in_month(month, year);
        let mut month_revenue = 0.0;
        let mut month_sold = 0u32;
        let mut month_blocked = 0u32;

        for apartment in apartments {
            for day in 1..=days {
                let Some(cell) = calendar.cell(year, month, apartment.id, day) else {
                    continue;
                };
                if cell.is_blocked() {
                    month_blocked += 1;
                } else if cell.is_sold() {
                    month_sold += 1;
                    month_revenue += cell.price.unwrap_or(0.0);
                }
            }
        }

        revenue.set(month, month_revenue);
        sold.set(month, f64::from(month_sold));
        blocked.set(month, f64::from(month_blocked));
        available.set(month, apartments.len() as f64 * f64::from(days));
    }

    ActualResultSet {
        year,
        performance: PerformanceSeries::from_counts(revenue, sold, available),
        available_nights: available,
        blocked_nights: blocked,
    }
}

/// Sold nights and revenue on the books for one month, with the ratios
/// derived from them.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnTheBooks {
    pub revenue: f64,
    pub sold_nights: u32,
    pub blocked_nights: u32,
    pub available_nights: f64,
    pub occupancy_pct: f64,
    pub adr: f64,
    pub revpar: f64,
}

impl OnTheBooks {
    fn from_counts(revenue: f64, sold_nights: u32, blocked_nights: u32, available_nights: f64) -> Self {
        let sold = f64::from(sold_nights);
        Self {
            revenue,
            sold_nights,
            blocked_nights,
            available_nights,
            occupancy_pct: safe_div(sold, available_nights) * 100.0,
            adr: safe_div(revenue, sold),
            revpar: safe_div(revenue, available_nights),
        }
    }
}

/// Gap between the books and a plan month. Positive means ahead of plan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthVariance {
    pub revenue: f64,
    pub sold_nights: f64,
    pub occupancy_pct: f64,
    pub adr: f64,
    pub revpar: f64,
}

/// One month of the booking grid, per apartment and for the portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthSummary {
    pub year: i32,
    pub month: Month,
    pub days: u32,
    pub apartments: Vec<(ApartmentId, OnTheBooks)>,
    pub total: OnTheBooks,
}

impl MonthSummary {
    pub fn apartment(&self, id: ApartmentId) -> Option<&OnTheBooks> {
        self.apartments
            .iter()
            .find(|(apt, _)| *apt == id)
            .map(|(_, books)| books)
    }

    /// Books minus the plan's figures for the same month.
    pub fn budget_variance(&self, plan: &MonthMetrics) -> MonthVariance {
        MonthVariance {
            revenue: self.total.revenue - plan.revenue,
            sold_nights: f64::from(self.total.sold_nights) - plan.sold_nights,
            occupancy_pct: self.total.occupancy_pct - plan.occupancy_pct,
            adr: self.total.adr - plan.adr,
            revpar: self.total.revpar - plan.revpar,
        }
    }
}

/// On-the-books summary of `month`.
///
/// Each apartment is measured against the days of the month; the portfolio
/// against `apartments × days`.
pub fn month_summary(
    calendar: &BookingCalendar,
    apartments: &[Apartment],
    year: i32,
    month: Month,
) -> MonthSummary {
    let days = days_in_month(month, year);
    let mut per_apartment = Vec::with_capacity(apartments.len());
    let (mut revenue, mut sold, mut blocked) = (0.0, 0u32, 0u32);

    for apartment in apartments {
        let (mut apt_revenue, mut apt_sold, mut apt_blocked) = (0.0, 0u32, 0u32);
        for day in 1..=days {
            match calendar.cell(year, month, apartment.id, day) {
                Some(cell) if cell.is_blocked() => apt_blocked += 1,
                Some(cell) if cell.is_sold() => {
                    apt_sold += 1;
                    apt_revenue += cell.price.unwrap_or(0.0);
                }
                _ => {}
            }
        }
        revenue += apt_revenue;
        sold += apt_sold;
        blocked += apt_blocked;
        per_apartment.push((
            apartment.id,
            OnTheBooks::from_counts(apt_revenue, apt_sold, apt_blocked, f64::from(days)),
        ));
    }

    let available = apartments.len() as f64 * f64::from(days);
    MonthSummary {
        year,
        month,
        days,
        apartments: per_apartment,
        total: OnTheBooks::from_counts(revenue, sold, blocked, available),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_apartment() -> Vec<Apartment> {
        vec![Apartment::new(1, "Loft")]
    }

    #[test]
    fn blocked_day_is_not_occupancy() {
        let mut calendar = BookingCalendar::new();
        calendar.set_cell(2025, Month::April, ApartmentId::new(1), 10, BookingCell::blocked());

        let result = compute_actuals_from_bookings(&calendar, &one_apartment(), 2025);
        let perf = result.performance;

        assert_eq!(perf.nights.month(Month::April), 0.0);
        assert_eq!(perf.revenue.month(Month::April), 0.0);
        assert_eq!(perf.occupancy_pct.month(Month::April), 0.0);
        assert_eq!(result.available_nights.get(Month::April), 30.0);
        assert_eq!(result.blocked_nights.get(Month::April), 1.0);
    }

    #[test]
    fn sold_requires_channel_and_positive_price() {
        assert!(BookingCell::sold("airbnb", 80.0).is_sold());
        assert!(!BookingCell::sold("  ", 80.0).is_sold());
        assert!(!BookingCell::sold("booking", 0.0).is_sold());
        assert!(!BookingCell::blocked().is_sold());
        assert!(!BookingCell {
            price: Some(f64::NAN),
            channel: Some("direct".into())
        }
        .is_sold());
    }

    #[test]
    fn month_figures_follow_bookings() {
        let apartments = vec![Apartment::new(1, "A"), Apartment::new(2, "B")];
        let mut calendar = BookingCalendar::new();
        calendar.set_cell(2025, Month::June, ApartmentId::new(1), 1, BookingCell::sold("direct", 100.0));
        calendar.set_cell(2025, Month::June, ApartmentId::new(2), 2, BookingCell::sold("ota", 50.0));
        calendar.set_cell(2025, Month::June, ApartmentId::new(2), 3, BookingCell::blocked());
        // Day 31 does not exist in June and is ignored.
        calendar.set_cell(2025, Month::June, ApartmentId::new(1), 31, BookingCell::sold("ota", 999.0));

        let result = compute_actuals_from_bookings(&calendar, &apartments, 2025);
        let perf = result.performance;

        assert_eq!(perf.nights.month(Month::June), 2.0);
        assert_eq!(perf.revenue.month(Month::June), 150.0);
        assert_eq!(perf.adr.month(Month::June), 75.0);
        assert_eq!(perf.occupancy_pct.month(Month::June), 2.0 / 60.0 * 100.0);
        assert_eq!(perf.revpar.month(Month::June), 150.0 / 60.0);
        assert_eq!(perf.revenue.total(), 150.0);
        assert_eq!(perf.occupancy_pct.total(), 2.0 / 730.0 * 100.0);
    }

    #[test]
    fn other_years_are_ignored() {
        let mut calendar = BookingCalendar::new();
        calendar.set_cell(2024, Month::June, ApartmentId::new(1), 1, BookingCell::sold("direct", 100.0));
        let result = compute_actuals_from_bookings(&calendar, &one_apartment(), 2025);
        assert_eq!(result.performance.revenue.total(), 0.0);
    }

    #[test]
    fn no_apartments_means_zero_everything() {
        let result = compute_actuals_from_bookings(&BookingCalendar::new(), &[], 2025);
        assert!(result.performance.all_values().all(|v| v == 0.0));
    }

    #[test]
    fn legacy_color_field_is_accepted() {
        let cell: BookingCell = serde_json::from_str(r#"{"price": 90, "color": "blue"}"#).unwrap();
        assert!(cell.is_sold());
    }

    #[test]
    fn clearing_a_cell_removes_it() {
        let mut calendar = BookingCalendar::new();
        let apt = ApartmentId::new(3);
        calendar.set_cell(2025, Month::May, apt, 4, BookingCell::sold("direct", 10.0));
        calendar.clear_cell(2025, Month::May, apt, 4);
        assert!(calendar.cell(2025, Month::May, apt, 4).is_none());
    }

    #[test]
    fn month_summary_per_apartment_and_total() {
        let apartments = vec![Apartment::new(1, "A"), Apartment::new(2, "B")];
        let mut calendar = BookingCalendar::new();
        calendar.set_cell(2025, Month::April, ApartmentId::new(1), 1, BookingCell::sold("direct", 100.0));
        calendar.set_cell(2025, Month::April, ApartmentId::new(1), 2, BookingCell::sold("ota", 80.0));
        calendar.set_cell(2025, Month::April, ApartmentId::new(2), 1, BookingCell::sold("ota", 60.0));
        calendar.set_cell(2025, Month::April, ApartmentId::new(2), 2, BookingCell::blocked());

        let summary = month_summary(&calendar, &apartments, 2025, Month::April);
        assert_eq!(summary.days, 30);

        let a = summary.apartment(ApartmentId::new(1)).unwrap();
        assert_eq!(a.sold_nights, 2);
        assert_eq!(a.adr, 90.0);
        assert_eq!(a.occupancy_pct, 2.0 / 30.0 * 100.0);
        assert_eq!(a.revpar, 180.0 / 30.0);

        let b = summary.apartment(ApartmentId::new(2)).unwrap();
        assert_eq!(b.blocked_nights, 1);
        assert_eq!(b.sold_nights, 1);

        assert_eq!(summary.total.revenue, 240.0);
        assert_eq!(summary.total.sold_nights, 3);
        assert_eq!(summary.total.available_nights, 60.0);
        assert_eq!(summary.total.occupancy_pct, 5.0);
        assert_eq!(summary.total.adr, 80.0);
        assert_eq!(summary.total.revpar, 4.0);
    }

    #[test]
    fn empty_portfolio_summary_is_all_zero() {
        let summary = month_summary(&BookingCalendar::new(), &[], 2025, Month::May);
        assert!(summary.apartments.is_empty());
        assert_eq!(summary.total, OnTheBooks::default());
    }

    #[test]
    fn budget_variance_is_books_minus_plan() {
        let apartments = one_apartment();
        let mut calendar = BookingCalendar::new();
        calendar.set_cell(2025, Month::March, ApartmentId::new(1), 5, BookingCell::sold("direct", 120.0));
        let summary = month_summary(&calendar, &apartments, 2025, Month::March);

        let plan = crate::domain::metrics::PlanWorksheet::new(
            crate::domain::metrics::PlanKind::Budget,
            1,
        )
        .metrics(2025);
        let march = plan.month(Month::March);

        let variance = summary.budget_variance(march);
        assert_eq!(variance.revenue, 120.0 - march.revenue);
        assert_eq!(variance.sold_nights, 1.0 - march.sold_nights);
        assert_eq!(variance.adr, 120.0 - march.adr);
    }
}
