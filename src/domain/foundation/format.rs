//! Italian-locale number formatting for reports and change logs.
//!
//! Grouping uses `.` and the decimal separator is `,`. Non-finite values
//! never reach the output: each formatter has a fixed fallback.

/// Fallback rendered for a non-finite currency value.
pub const CURRENCY_FALLBACK: &str = "€ 0,00";
/// Fallback rendered for a non-finite integer value.
pub const INTEGER_FALLBACK: &str = "0";
/// Fallback rendered for a non-finite percentage.
pub const PERCENTAGE_FALLBACK: &str = "0,00%";
/// Fallback rendered for a non-finite index value.
pub const INDEX_FALLBACK: &str = "0,00";

/// `€ 1.234,56`
pub fn format_currency(value: f64) -> String {
    if !value.is_finite() {
        return CURRENCY_FALLBACK.to_string();
    }
    format!("€ {}", format_decimal(value, 2))
}

/// `1.235`
pub fn format_integer(value: f64) -> String {
    if !value.is_finite() {
        return INTEGER_FALLBACK.to_string();
    }
    format_decimal(value, 0)
}

/// `12,50%`
pub fn format_percentage(value: f64) -> String {
    if !value.is_finite() {
        return PERCENTAGE_FALLBACK.to_string();
    }
    format!("{}%", format_decimal(value, 2))
}

/// `0,75`
pub fn format_index(value: f64) -> String {
    if !value.is_finite() {
        return INDEX_FALLBACK.to_string();
    }
    format_decimal(value, 2)
}

/// Fixed-point rendering with Italian separators.
pub fn format_decimal(value: f64, decimals: usize) -> String {
    let rendered = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match rendered.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (rendered.as_str(), None),
    };

    let is_zero = rendered.chars().all(|c| c == '0' || c == '.');
    let mut out = String::with_capacity(rendered.len() + 4);
    if value.is_sign_negative() && !is_zero {
        out.push('-');
    }
    out.push_str(&group_thousands(int_part));
    if let Some(frac) = frac_part {
        out.push(',');
        out.push_str(frac);
    }
    out
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}
