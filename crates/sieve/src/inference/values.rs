//! Parsing of individual cell values under each column type.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::schema::ColumnType;

/// Tokens accepted as booleans (compared case-insensitively).
pub const BOOLEAN_TOKENS: &[&str] = &["true", "false", "yes", "no", "t", "f", "y", "n"];

/// Date-only formats tried in order.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y"];

/// Date-time formats tried in order. `%.f` also matches an absent fraction.
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse a value as a finite number.
pub fn parse_number(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
}

/// Returns true if the value is a whole number in integer notation.
pub fn is_integer(value: &str) -> bool {
    value.trim().parse::<i64>().is_ok()
}

/// Returns true if the value is one of the boolean tokens.
pub fn is_boolean(value: &str) -> bool {
    let trimmed = value.trim();
    BOOLEAN_TOKENS
        .iter()
        .any(|token| trimmed.eq_ignore_ascii_case(token))
}

/// Returns true if the value parses under one of the supported date formats.
pub fn is_date(value: &str) -> bool {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return false;
    }

    DATE_FORMATS
        .iter()
        .any(|fmt| NaiveDate::parse_from_str(trimmed, fmt).is_ok())
        || DATETIME_FORMATS
            .iter()
            .any(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).is_ok())
        || DateTime::parse_from_rfc3339(trimmed).is_ok()
}

/// Check a single value against a column type.
///
/// String and unknown columns accept everything.
pub fn conforms_to(column_type: ColumnType, value: &str) -> bool {
    match column_type {
        ColumnType::Integer => is_integer(value),
        ColumnType::Float => parse_number(value).is_some(),
        ColumnType::Boolean => is_boolean(value),
        ColumnType::Date => is_date(value),
        ColumnType::String | ColumnType::Unknown => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number(" 42 "), Some(42.0));
        assert_eq!(parse_number("-1.5e2"), Some(-150.0));
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("12abc"), None);
    }

    #[test]
    fn test_boolean_tokens_exclude_digits() {
        assert!(is_boolean("TRUE"));
        assert!(is_boolean("n"));
        assert!(!is_boolean("1"));
        assert!(!is_boolean("0"));
    }

    #[test]
    fn test_dates() {
        assert!(is_date("2024-01-15"));
        assert!(is_date("01/15/2024"));
        assert!(is_date("15.01.2024"));
        assert!(is_date("2024-01-15T10:30:00"));
        assert!(is_date("2024-01-15 10:30:00.250"));
        assert!(is_date("2024-01-15T10:30:00+02:00"));
        assert!(!is_date("2024-13-45"));
        assert!(!is_date("yesterday"));
        assert!(!is_date("2024"));
    }

    #[test]
    fn test_conforms_to() {
        assert!(conforms_to(ColumnType::Integer, "7"));
        assert!(!conforms_to(ColumnType::Integer, "7.5"));
        assert!(conforms_to(ColumnType::Float, "7"));
        assert!(!conforms_to(ColumnType::Float, "seven"));
        assert!(conforms_to(ColumnType::String, "anything"));
    }
}
