//! Calendar months and day counts.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;

/// Number of months in a planning year.
pub const MONTHS_PER_YEAR: usize = 12;

/// A calendar month. Index 0 is January.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Month {
    January,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}

impl Month {
    /// All months in calendar order.
    pub const ALL: [Month; MONTHS_PER_YEAR] = [
        Month::January,
        Month::February,
        Month::March,
        Month::April,
        Month::May,
        Month::June,
        Month::July,
        Month::August,
        Month::September,
        Month::October,
        Month::November,
        Month::December,
    ];

    /// Zero-based position (January = 0).
    pub fn index(self) -> usize {
        self as usize
    }

    /// One-based calendar number (January = 1).
    pub fn number(self) -> u32 {
        self as u32 + 1
    }

    /// Month at a zero-based position.
    pub fn from_index(index: usize) -> Result<Self, ValidationError> {
        Self::ALL
            .get(index)
            .copied()
            .ok_or_else(|| ValidationError::out_of_range("month", 0, 11, index as i32))
    }

    /// English month name.
    pub fn name(self) -> &'static str {
        match self {
            Month::January => "January",
            Month::February => "February",
            Month::March => "March",
            Month::April => "April",
            Month::May => "May",
            Month::June => "June",
            Month::July => "July",
            Month::August => "August",
            Month::September => "September",
            Month::October => "October",
            Month::November => "November",
            Month::December => "December",
        }
    }

    /// Number of calendar days in this month of `year`.
    pub fn days(self, year: i32) -> u32 {
        days_in_month(self, year)
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Gregorian leap-year rule.
pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Calendar days in `month` of `year`.
pub fn days_in_month(month: Month, year: i32) -> u32 {
    match month {
        Month::February if is_leap_year(year) => 29,
        Month::February => 28,
        Month::April | Month::June | Month::September | Month::November => 30,
        _ => 31,
    }
}

/// Calendar days in `year`.
pub fn days_in_year(year: i32) -> u32 {
    if is_leap_year(year) {
        366
    } else {
        365
    }
}
