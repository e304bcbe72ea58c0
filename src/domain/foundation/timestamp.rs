//! Timestamp value object for immutable points in time.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

/// Immutable point in time, always UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a timestamp for the current moment.
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a timestamp from a DateTime<Utc>.
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Returns the inner DateTime.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Checks if this timestamp is before another.
    pub fn is_before(&self, other: &Timestamp) -> bool {
        self.0 < other.0
    }

    /// Checks if this timestamp is after another.
    pub fn is_after(&self, other: &Timestamp) -> bool {
        self.0 > other.0
    }

    /// Calendar year of this timestamp.
    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// ISO date, `YYYY-MM-DD`. Used in backup file names.
    pub fn date_stamp(&self) -> String {
        self.0.format("%Y-%m-%d").to_string()
    }

    /// Day-first date, `DD/MM/YYYY`. Used for snapshot headings.
    pub fn display_date(&self) -> String {
        self.0.format("%d/%m/%Y").to_string()
    }

    /// RFC 3339 representation with millisecond precision.
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_rfc3339())
    }
}
