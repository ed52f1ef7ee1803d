//! Minor-unit money handling.
//!
//! All amounts inside the platform are integers in the currency's minor unit
//! (cents). No floating-point currency arithmetic is permitted. The one
//! sanctioned exception is vendors whose own API contract is decimal-string
//! native (Printful order/cost schemas, Salesforce `Amount` fields); those
//! conversions happen here and are called only from connector boundaries.

use thiserror::Error;

/// Errors parsing a vendor decimal string into minor units.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyParseError {
    #[error("empty amount string")]
    Empty,

    #[error("non-numeric amount: {0}")]
    NotNumeric(String),

    #[error("more than two fraction digits: {0}")]
    TooManyFractionDigits(String),

    #[error("amount out of range: {0}")]
    OutOfRange(String),
}

/// Convert minor units to the two-decimal string vendors expect.
///
/// `1999` becomes `"19.99"`, `-50` becomes `"-0.50"`.
pub fn minor_units_to_decimal_string(minor_units: i64) -> String {
    let sign = if minor_units < 0 { "-" } else { "" };
    let abs = minor_units.unsigned_abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}

/// Parse a vendor decimal string back into minor units.
///
/// Accepts up to two fraction digits; a missing fraction means whole
/// currency units. Round-trips exactly with
/// [`minor_units_to_decimal_string`].
pub fn decimal_string_to_minor_units(value: &str) -> Result<i64, MoneyParseError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(MoneyParseError::Empty);
    }

    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };

    let (whole, frac) = match digits.split_once('.') {
        Some((w, f)) => (w, f),
        None => (digits, ""),
    };

    if whole.is_empty() && frac.is_empty() {
        return Err(MoneyParseError::NotNumeric(value.to_string()));
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit()) {
        return Err(MoneyParseError::NotNumeric(value.to_string()));
    }

    let whole_units: i64 = if whole.is_empty() {
        0
    } else {
        whole
            .parse()
            .map_err(|_| MoneyParseError::OutOfRange(value.to_string()))?
    };

    let frac_units: i64 = match frac.len() {
        0 => 0,
        1 => frac
            .parse::<i64>()
            .map_err(|_| MoneyParseError::NotNumeric(value.to_string()))?
            * 10,
        2 => frac
            .parse()
            .map_err(|_| MoneyParseError::NotNumeric(value.to_string()))?,
        _ => return Err(MoneyParseError::TooManyFractionDigits(value.to_string())),
    };

    let minor = whole_units
        .checked_mul(100)
        .and_then(|w| w.checked_add(frac_units))
        .ok_or_else(|| MoneyParseError::OutOfRange(value.to_string()))?;

    Ok(if negative { -minor } else { minor })
}

/// Convert minor units to major currency units for vendors that take
/// numeric amounts (Salesforce Opportunity `Amount`).
pub fn minor_units_to_major(minor_units: i64) -> f64 {
    minor_units as f64 / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn formats_whole_and_fraction() {
        assert_eq!(minor_units_to_decimal_string(1999), "19.99");
        assert_eq!(minor_units_to_decimal_string(5000), "50.00");
        assert_eq!(minor_units_to_decimal_string(5), "0.05");
        assert_eq!(minor_units_to_decimal_string(0), "0.00");
    }

    #[test]
    fn formats_negative_amounts() {
        assert_eq!(minor_units_to_decimal_string(-50), "-0.50");
        assert_eq!(minor_units_to_decimal_string(-1999), "-19.99");
    }

    #[test]
    fn parses_vendor_strings() {
        assert_eq!(decimal_string_to_minor_units("19.99").unwrap(), 1999);
        assert_eq!(decimal_string_to_minor_units("50").unwrap(), 5000);
        assert_eq!(decimal_string_to_minor_units("0.5").unwrap(), 50);
        assert_eq!(decimal_string_to_minor_units("-0.50").unwrap(), -50);
        assert_eq!(decimal_string_to_minor_units(" 12.30 ").unwrap(), 1230);
    }

    #[test]
    fn rejects_garbage() {
        assert!(decimal_string_to_minor_units("").is_err());
        assert!(decimal_string_to_minor_units("abc").is_err());
        assert!(decimal_string_to_minor_units("1.234").is_err());
        assert!(decimal_string_to_minor_units(".").is_err());
        assert!(decimal_string_to_minor_units("1.2x").is_err());
    }

    #[test]
    fn converts_to_major_units() {
        assert_eq!(minor_units_to_major(5000), 50.0);
        assert_eq!(minor_units_to_major(1999), 19.99);
    }

    proptest! {
        // Price conversion must round-trip within one cent; with integer
        // parsing it round-trips exactly.
        #[test]
        fn round_trips_exactly(cents in 0i64..=10_000_000) {
            let formatted = minor_units_to_decimal_string(cents);
            let parsed = decimal_string_to_minor_units(&formatted).unwrap();
            prop_assert_eq!(parsed, cents);
        }
    }
}
