//! Canonical value formats checked by format rules.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::inference::values;

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid email regex")
});

static PHONE_SEPARATORS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\s\-().]").expect("valid phone separator regex"));

static PHONE_DIGITS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?\d{7,15}$").expect("valid phone regex"));

/// A value format a column can be checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Email,
    Phone,
    Date,
}

impl Format {
    /// Parse a lowercase format name.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "email" => Some(Format::Email),
            "phone" => Some(Format::Phone),
            "date" => Some(Format::Date),
            _ => None,
        }
    }

    /// The format a column name designates, if any.
    ///
    /// Email wins over phone, phone over date.
    pub fn for_column_name(name: &str) -> Option<Self> {
        let lower = name.to_lowercase();
        let tokens: Vec<&str> = lower
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|t| !t.is_empty())
            .collect();

        if lower.contains("email") || lower.contains("mail") {
            return Some(Format::Email);
        }

        if lower.contains("phone") || lower.contains("mobile") || tokens.contains(&"tel") {
            return Some(Format::Phone);
        }

        let is_date_token = |t: &&str| {
            matches!(*t, "date" | "datetime" | "time" | "timestamp" | "dob")
                || (t.ends_with("date") && *t != "update")
        };
        if tokens.iter().any(is_date_token) {
            return Some(Format::Date);
        }

        None
    }

    /// Check a non-missing value against this format.
    pub fn matches(&self, value: &str) -> bool {
        let trimmed = value.trim();
        match self {
            Format::Email => EMAIL.is_match(trimmed),
            Format::Phone => PHONE_DIGITS.is_match(&PHONE_SEPARATORS.replace_all(trimmed, "")),
            Format::Date => values::is_date(trimmed),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Email => "email",
            Format::Phone => "phone",
            Format::Date => "date",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
