//! Twelve-month numeric series and their display rows.

use serde::{Deserialize, Serialize};
use std::ops::Index;

use super::calendar::{Month, MONTHS_PER_YEAR};
use super::ValidationError;

/// Length of a display row: the yearly total followed by twelve months.
pub const DISPLAY_ROW_LEN: usize = MONTHS_PER_YEAR + 1;

/// Replaces NaN and infinities with zero.
pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Division that yields zero instead of NaN or infinity.
pub fn safe_div(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 || !denominator.is_finite() {
        return 0.0;
    }
    finite_or_zero(numerator / denominator)
}

/// Exactly twelve monthly values, January first.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MonthlySeries([f64; MONTHS_PER_YEAR]);

impl MonthlySeries {
    /// All months zero.
    pub fn zeros() -> Self {
        Self([0.0; MONTHS_PER_YEAR])
    }

    /// Every month set to `value`.
    pub fn filled(value: f64) -> Self {
        Self([value; MONTHS_PER_YEAR])
    }

    pub fn from_values(values: [f64; MONTHS_PER_YEAR]) -> Self {
        Self(values)
    }

    /// Builds a series by evaluating `f` for every month.
    pub fn from_fn(mut f: impl FnMut(Month) -> f64) -> Self {
        let mut values = [0.0; MONTHS_PER_YEAR];
        for month in Month::ALL {
            values[month.index()] = f(month);
        }
        Self(values)
    }

    pub fn get(&self, month: Month) -> f64 {
        self.0[month.index()]
    }

    /// Field-at-index replacement.
    /// Non-finite values are stored as 0.
    pub fn set(&mut self, month: Month, value: f64) {
        self.0[month.index()] = finite_or_zero(value);
    }

    pub fn values(&self) -> &[f64; MONTHS_PER_YEAR] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.0.iter().copied()
    }

    /// Sum in calendar order.
    pub fn sum(&self) -> f64 {
        self.0.iter().sum()
    }

    pub fn map(&self, mut f: impl FnMut(f64) -> f64) -> Self {
        Self(self.0.map(&mut f))
    }

    /// Combines two series month by month.
    pub fn zip_with(&self, other: &Self, mut f: impl FnMut(f64, f64) -> f64) -> Self {
        Self::from_fn(|m| f(self.get(m), other.get(m)))
    }

    /// Copy with non-finite values replaced by zero.
    pub fn sanitized(&self) -> Self {
        self.map(finite_or_zero)
    }
}

impl Index<Month> for MonthlySeries {
    type Output = f64;

    fn index(&self, month: Month) -> &f64 {
        &self.0[month.index()]
    }
}

/// A monthly series paired with its yearly total.
///
/// Serialized as the 13-element display row `[total, jan, ..., dec]`.
/// Totals are produced by the computation that builds the row (a sum or a
/// weighted ratio) and are never edited independently of the months.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(into = "Vec<f64>", try_from = "Vec<f64>")]
pub struct SeriesWithTotal {
    total: f64,
    months: MonthlySeries,
}

impl SeriesWithTotal {
    /// Additive metric: total is the sum of the months.
    pub fn summed(months: MonthlySeries) -> Self {
        Self {
            total: months.sum(),
            months,
        }
    }

    /// Rate-like metric whose total is a weighted ratio computed by the caller.
    pub fn with_total(months: MonthlySeries, total: f64) -> Self {
        Self { total, months }
    }

    pub fn zeros() -> Self {
        Self::default()
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    pub fn months(&self) -> &MonthlySeries {
        &self.months
    }

    pub fn month(&self, month: Month) -> f64 {
        self.months.get(month)
    }

    /// Display row: index 0 is the total, 1..=12 are the months.
    pub fn to_row(&self) -> [f64; DISPLAY_ROW_LEN] {
        let mut row = [0.0; DISPLAY_ROW_LEN];
        row[0] = self.total;
        row[1..].copy_from_slice(self.months.values());
        row
    }

    /// Parses a display row, rejecting anything that is not 13 values long.
    pub fn from_row(row: &[f64]) -> Result<Self, ValidationError> {
        if row.len() != DISPLAY_ROW_LEN {
            return Err(ValidationError::invalid_format(
                "series",
                format!("expected {} values, got {}", DISPLAY_ROW_LEN, row.len()),
            ));
        }
        let mut months = [0.0; MONTHS_PER_YEAR];
        months.copy_from_slice(&row[1..]);
        Ok(Self {
            total: row[0],
            months: MonthlySeries::from_values(months),
        })
    }

    /// Element-wise combination over all 13 positions.
    pub fn zip_with(&self, other: &Self, mut f: impl FnMut(f64, f64) -> f64) -> Self {
        Self {
            total: f(self.total, other.total),
            months: self.months.zip_with(&other.months, f),
        }
    }
}

impl From<SeriesWithTotal> for Vec<f64> {
    fn from(series: SeriesWithTotal) -> Self {
        series.to_row().to_vec()
    }
}

impl TryFrom<Vec<f64>> for SeriesWithTotal {
    type Error = ValidationError;

    fn try_from(row: Vec<f64>) -> Result<Self, Self::Error> {
        Self::from_row(&row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safe_div_never_produces_non_finite_values() {
        assert_eq!(safe_div(10.0, 0.0), 0.0);
        assert_eq!(safe_div(0.0, 0.0), 0.0);
        assert_eq!(safe_div(10.0, f64::INFINITY), 0.0);
        assert_eq!(safe_div(f64::NAN, 2.0), 0.0);
        assert_eq!(safe_div(9.0, 3.0), 3.0);
    }

    #[test]
    fn summed_total_matches_months() {
        let series = SeriesWithTotal::summed(MonthlySeries::from_fn(|m| m.number() as f64));
        assert_eq!(series.total(), 78.0);
        assert_eq!(series.month(Month::March), 3.0);
    }

    #[test]
    fn display_row_puts_total_first() {
        let series = SeriesWithTotal::summed(MonthlySeries::filled(2.0));
        let row = series.to_row();
        assert_eq!(row[0], 24.0);
        assert!(row[1..].iter().all(|v| *v == 2.0));
    }

    #[test]
    fn deserialization_rejects_wrong_row_length() {
        let short = serde_json::from_str::<SeriesWithTotal>("[1,2,3]");
        assert!(short.is_err());

        let row: Vec<f64> = (0..13).map(f64::from).collect();
        let json = serde_json::to_string(&row).unwrap();
        let series: SeriesWithTotal = serde_json::from_str(&json).unwrap();
        assert_eq!(series.total(), 0.0);
        assert_eq!(series.month(Month::December), 12.0);
    }

    #[test]
    fn monthly_series_rejects_wrong_length() {
        assert!(serde_json::from_str::<MonthlySeries>("[1,2]").is_err());
        assert!(serde_json::from_str::<MonthlySeries>("[0,0,0,0,0,0,0,0,0,0,0,0]").is_ok());
    }

    #[test]
    fn sanitized_clears_nan() {
        let mut series = MonthlySeries::filled(1.0);
        series.set(Month::May, f64::NAN);
        assert_eq!(series.sanitized().get(Month::May), 0.0);
        assert_eq!(series.sanitized().sum(), 11.0);
    }
}
