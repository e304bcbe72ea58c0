//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, calendar helpers, numeric coercion
//! and error types that form the vocabulary of the revenue domain.

mod calendar;
mod errors;
mod format;
mod ids;
mod input;
mod monthly_series;
mod snapshot;
mod timestamp;

pub use calendar::{days_in_month, days_in_year, is_leap_year, Month, MONTHS_PER_YEAR};
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use format::{
    format_currency, format_decimal, format_index, format_integer, format_percentage,
    CURRENCY_FALLBACK, INDEX_FALLBACK, INTEGER_FALLBACK, PERCENTAGE_FALLBACK,
};
pub use ids::{ApartmentId, CompetitorId, CostItemId};
pub use input::{parse_decimal, parse_unit_count};
pub use monthly_series::{finite_or_zero, safe_div, MonthlySeries, SeriesWithTotal, DISPLAY_ROW_LEN};
pub use snapshot::{backup_file_name, StoreSnapshot};
pub use timestamp::Timestamp;
