//! Monthly planning assumptions and the editable worksheet that owns them.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{
    finite_or_zero, format_currency, format_percentage, Month, MonthlySeries, Timestamp, ValidationError,
    MONTHS_PER_YEAR,
};

const DEFAULT_OCCUPANCY_PCT: [f64; MONTHS_PER_YEAR] =
    [1.0, 3.0, 10.0, 30.0, 30.0, 70.0, 80.0, 90.0, 70.0, 10.0, 1.0, 3.0];

const DEFAULT_ADR: [f64; MONTHS_PER_YEAR] = [
    60.0, 60.0, 50.0, 60.0, 55.0, 90.0, 100.0, 150.0, 90.0, 50.0, 60.0, 60.0,
];

/// Expected occupancy, average daily rate and last year's revenue, by month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssumptionSet {
    pub occupancy_pct: MonthlySeries,
    pub adr: MonthlySeries,
    pub prior_year_revenue: MonthlySeries,
}

impl Default for AssumptionSet {
    fn default() -> Self {
        Self {
            occupancy_pct: MonthlySeries::from_values(DEFAULT_OCCUPANCY_PCT),
            adr: MonthlySeries::from_values(DEFAULT_ADR),
            prior_year_revenue: MonthlySeries::zeros(),
        }
    }
}

impl AssumptionSet {
    pub fn get(&self, field: AssumptionField, month: Month) -> f64 {
        self.series(field).get(month)
    }

    /// Field-at-index replacement.
    pub fn set(&mut self, field: AssumptionField, month: Month, value: f64) {
        match field {
            AssumptionField::OccupancyPct => self.occupancy_pct.set(month, value),
            AssumptionField::Adr => self.adr.set(month, value),
            AssumptionField::PriorYearRevenue => self.prior_year_revenue.set(month, value),
        }
    }

    pub fn series(&self, field: AssumptionField) -> &MonthlySeries {
        match field {
            AssumptionField::OccupancyPct => &self.occupancy_pct,
            AssumptionField::Adr => &self.adr,
            AssumptionField::PriorYearRevenue => &self.prior_year_revenue,
        }
    }
}

/// The editable series inside an [`AssumptionSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssumptionField {
    OccupancyPct,
    Adr,
    PriorYearRevenue,
}

impl AssumptionField {
    pub fn label(&self) -> &'static str {
        match self {
            AssumptionField::OccupancyPct => "Expected occupancy",
            AssumptionField::Adr => "ADR",
            AssumptionField::PriorYearRevenue => "Prior-year revenue",
        }
    }

    fn format(&self, value: f64) -> String {
        match self {
            AssumptionField::OccupancyPct => format_percentage(value),
            AssumptionField::Adr | AssumptionField::PriorYearRevenue => format_currency(value),
        }
    }
}

/// Rentable units per month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitCounts([u32; MONTHS_PER_YEAR]);

impl UnitCounts {
    /// Same count every month.
    pub fn filled(count: u32) -> Self {
        Self([count; MONTHS_PER_YEAR])
    }

    pub fn from_values(values: [u32; MONTHS_PER_YEAR]) -> Self {
        Self(values)
    }

    pub fn get(&self, month: Month) -> u32 {
        self.0[month.index()]
    }

    pub fn set(&mut self, month: Month, count: u32) {
        self.0[month.index()] = count;
    }

    pub fn as_series(&self) -> MonthlySeries {
        MonthlySeries::from_fn(|m| f64::from(self.get(m)))
    }
}

/// One change to a worksheet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlanEdit {
    Assumption {
        field: AssumptionField,
        month: Month,
        value: f64,
    },
    Units {
        month: Month,
        count: u32,
    },
}

/// Audit entry appended on every accepted edit and lock toggle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub timestamp: Timestamp,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl LogEntry {
    fn new(description: impl Into<String>, comment: Option<String>) -> Self {
        Self {
            timestamp: Timestamp::now(),
            description: description.into(),
            comment,
        }
    }
}

/// Which plan a worksheet holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanKind {
    Budget,
    Forecast,
}

impl fmt::Display for PlanKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanKind::Budget => write!(f, "budget"),
            PlanKind::Forecast => write!(f, "forecast"),
        }
    }
}

/// Assumptions and unit counts for one plan, with a lock flag and change log.
///
/// Budget and rolling forecast each own an independent worksheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanWorksheet {
    pub kind: PlanKind,
    pub assumptions: AssumptionSet,
    pub units: UnitCounts,
    #[serde(default)]
    locked: bool,
    #[serde(default)]
    log: Vec<LogEntry>,
}

impl PlanWorksheet {
    /// Worksheet with default assumptions and `units` every month.
    pub fn new(kind: PlanKind, units: u32) -> Self {
        Self {
            kind,
            assumptions: AssumptionSet::default(),
            units: UnitCounts::filled(units),
            locked: false,
            log: Vec::new(),
        }
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn log(&self) -> &[LogEntry] {
        &self.log
    }

    /// Applies an edit and records it.
    ///
    /// Returns `Ok(None)` when the edit does not change the stored value.
    pub fn apply(
        &mut self,
        edit: PlanEdit,
        comment: &str,
    ) -> Result<Option<LogEntry>, ValidationError> {
        if self.locked {
            return Err(ValidationError::locked(self.kind.to_string()));
        }
        if comment.trim().is_empty() {
            return Err(ValidationError::empty_field("comment"));
        }

        let description = match edit {
            PlanEdit::Assumption {
                field,
                month,
                value,
            } => {
                let value = finite_or_zero(value);
                let old = self.assumptions.get(field, month);
                if old == value {
                    return Ok(None);
                }
                self.assumptions.set(field, month, value);
                format!(
                    "{} for {} changed from {} to {}",
                    field.label(),
                    month,
                    field.format(old),
                    field.format(value)
                )
            }
            PlanEdit::Units { month, count } => {
                let old = self.units.get(month);
                if old == count {
                    return Ok(None);
                }
                self.units.set(month, count);
                format!("Units for {} changed from {} to {}", month, old, count)
            }
        };

        let entry = LogEntry::new(description, Some(comment.trim().to_string()));
        self.log.push(entry.clone());
        Ok(Some(entry))
    }

    /// Locks or unlocks the worksheet. Toggles are logged; no-ops are not.
    pub fn set_locked(&mut self, locked: bool) {
        if self.locked == locked {
            return;
        }
        self.locked = locked;
        let description = if locked {
            format!("{} locked", capitalize(&self.kind.to_string()))
        } else {
            format!("{} unlocked", capitalize(&self.kind.to_string()))
        };
        self.log.push(LogEntry::new(description, None));
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
