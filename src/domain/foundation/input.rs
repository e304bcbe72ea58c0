//! Coercion of free-text numeric input.
//!
//! Invalid entries never raise errors: decimals coerce to zero and unit
//! counts keep their previous value.

/// Parses a decimal entry, accepting `,` as the decimal separator.
///
/// Currency and percent symbols around the number are ignored. Anything
/// that does not yield a finite number becomes `0.0`.
pub fn parse_decimal(input: &str) -> f64 {
    let cleaned = input
        .trim()
        .trim_start_matches('€')
        .trim_end_matches('%')
        .trim()
        .replacen(',', ".", 1);

    match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => 0.0,
    }
}

/// Parses a unit-count entry.
///
/// Empty input clears the count to zero. Negative or non-numeric input is
/// ignored and `current` is returned unchanged.
pub fn parse_unit_count(input: &str, current: u32) -> u32 {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return 0;
    }
    match trimmed.parse::<i64>() {
        Ok(value) if value >= 0 => u32::try_from(value).unwrap_or(u32::MAX),
        _ => current,
    }
}
