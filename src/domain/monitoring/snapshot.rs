use serde::{Deserialize, Serialize};

use crate::domain::foundation::Timestamp;
use crate::domain::metrics::PerformanceSeries;

/// Point-in-time copy of on-the-books performance.
///
/// Saved explicitly and only ever replaced wholesale by a later save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActualSnapshot {
    pub taken_at: Timestamp,
    pub data: PerformanceSeries,
}

impl ActualSnapshot {
    pub fn capture(data: PerformanceSeries) -> Self {
        Self {
            taken_at: Timestamp::now(),
            data,
        }
    }

    /// Section heading, e.g. `Data as of 07/03/2025`.
    pub fn heading(&self) -> String {
        format!("Data as of {}", self.taken_at.display_date())
    }
}
