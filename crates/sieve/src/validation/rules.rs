//! Rule configuration and the compiled, immutable rule set.
//!
//! Rules arrive as [`ValidationRuleConfig`] records (typically JSON) and are
//! compiled once into a [`RuleSet`] of typed [`RuleKind`] variants. All
//! parameter validation happens here; a compiled rule set never fails
//! during a scan.

use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::issue::{IssueCategory, Severity};
use super::patterns::Format;
use crate::error::{Result, SieveError};
use crate::schema::ColumnType;

/// Rule type named in a configuration record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleType {
    MissingValue,
    DuplicateRow,
    TypeMismatch,
    FormatViolation,
    RangeViolation,
    Outlier,
    Custom,
}

impl RuleType {
    /// Parameter keys this rule type accepts, besides `severity`.
    fn allowed_parameters(&self) -> &'static [&'static str] {
        match self {
            RuleType::MissingValue => &["column", "threshold"],
            RuleType::DuplicateRow => &["columns"],
            RuleType::TypeMismatch => &["column", "expected_type"],
            RuleType::FormatViolation => &["column", "format", "required"],
            RuleType::RangeViolation => &["column", "min", "max"],
            RuleType::Outlier => &["column", "multiplier", "min_values"],
            RuleType::Custom => &["column", "pattern", "allowed_values"],
        }
    }
}

fn default_enabled() -> bool {
    true
}

/// A single rule as written in configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationRuleConfig {
    pub rule_name: String,
    pub rule_type: RuleType,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub parameters: IndexMap<String, Value>,
}

impl ValidationRuleConfig {
    /// Create an enabled rule with no parameters.
    pub fn new(rule_name: impl Into<String>, rule_type: RuleType) -> Self {
        Self {
            rule_name: rule_name.into(),
            rule_type,
            enabled: true,
            parameters: IndexMap::new(),
        }
    }

    /// Add a parameter.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    /// Set the enabled flag.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// Check applied by a custom rule.
#[derive(Debug, Clone)]
pub enum CustomCheck {
    /// Values must match the regex.
    Pattern(Regex),
    /// Values must be one of the listed strings.
    AllowedValues(Vec<String>),
}

/// A compiled rule variant with its typed parameters.
#[derive(Debug, Clone)]
pub enum RuleKind {
    /// Per-cell missing values, or one column issue above `threshold`.
    MissingValue {
        column: Option<String>,
        threshold: Option<f64>,
    },
    /// Repeated rows over all columns or `columns`.
    DuplicateRow { columns: Option<Vec<String>> },
    /// Values that do not parse under the column's type.
    TypeMismatch {
        column: Option<String>,
        expected: Option<ColumnType>,
    },
    /// Values that do not match a format. `format` is resolved from the column
    /// name when not given; with no column, every name-designated column is
    /// checked.
    FormatViolation {
        column: Option<String>,
        format: Option<Format>,
        required: bool,
    },
    /// Numeric values outside `[min, max]`.
    RangeViolation {
        column: String,
        min: Option<f64>,
        max: Option<f64>,
    },
    /// IQR outliers.
    Outlier {
        column: Option<String>,
        multiplier: f64,
        min_values: usize,
    },
    /// User-defined pattern or allow-list, reported as format violations.
    Custom { column: String, check: CustomCheck },
}

impl RuleKind {
    /// Category of the issues this rule raises.
    pub fn category(&self) -> IssueCategory {
        match self {
            RuleKind::MissingValue { .. } => IssueCategory::MissingValue,
            RuleKind::DuplicateRow { .. } => IssueCategory::DuplicateRow,
            RuleKind::TypeMismatch { .. } => IssueCategory::TypeMismatch,
            RuleKind::FormatViolation { .. } | RuleKind::Custom { .. } => {
                IssueCategory::FormatViolation
            }
            RuleKind::RangeViolation { .. } => IssueCategory::RangeViolation,
            RuleKind::Outlier { .. } => IssueCategory::Outlier,
        }
    }
}

/// A compiled rule.
#[derive(Debug, Clone)]
pub struct Rule {
    pub name: String,
    pub severity: Severity,
    pub enabled: bool,
    pub kind: RuleKind,
}

impl Rule {
    fn new(name: &str, kind: RuleKind) -> Self {
        Self {
            name: name.to_string(),
            severity: kind.category().default_severity(),
            enabled: true,
            kind,
        }
    }
}

/// An immutable, validated set of rules, shared by reference across
/// validations.
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// The built-in rule set: per-cell missing values, full-row duplicates,
    /// type mismatches, name-designated formats and IQR outliers.
    pub fn default_rules() -> Self {
        Self {
            rules: vec![
                Rule::new(
                    "missing_value",
                    RuleKind::MissingValue {
                        column: None,
                        threshold: None,
                    },
                ),
                Rule::new("duplicate_row", RuleKind::DuplicateRow { columns: None }),
                Rule::new(
                    "type_mismatch",
                    RuleKind::TypeMismatch {
                        column: None,
                        expected: None,
                    },
                ),
                Rule::new(
                    "format_violation",
                    RuleKind::FormatViolation {
                        column: None,
                        format: None,
                        required: false,
                    },
                ),
                Rule::new(
                    "outlier",
                    RuleKind::Outlier {
                        column: None,
                        multiplier: DEFAULT_IQR_MULTIPLIER,
                        min_values: DEFAULT_MIN_VALUES,
                    },
                ),
            ],
        }
    }

    /// Compile configuration records, rejecting the first malformed one.
    pub fn from_configs(configs: &[ValidationRuleConfig]) -> Result<Self> {
        let mut names = HashSet::new();
        let mut rules = Vec::with_capacity(configs.len());

        for config in configs {
            if config.rule_name.trim().is_empty() {
                return Err(SieveError::rule("", "rule name must not be empty"));
            }
            if !names.insert(config.rule_name.as_str()) {
                return Err(SieveError::rule(&config.rule_name, "duplicate rule name"));
            }
            rules.push(compile(config)?);
        }

        Ok(Self { rules })
    }

    /// Compile a JSON array of rule configurations.
    ///
    /// The input must be a JSON array; a record that does not describe a rule
    /// fails with [`SieveError::InvalidRuleConfig`].
    pub fn from_json_str(json: &str) -> Result<Self> {
        let records: Vec<Value> = serde_json::from_str(json)?;
        Self::from_configs(&parse_records(records)?)
    }

    /// Compile rule configurations from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| SieveError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let records: Vec<Value> = serde_json::from_reader(BufReader::new(file))?;
        Self::from_configs(&parse_records(records)?)
    }

    /// All rules in configuration order, disabled ones included.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Enabled rules in configuration order.
    pub fn enabled(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter().filter(|r| r.enabled)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::default_rules()
    }
}

/// Default IQR fence multiplier.
pub const DEFAULT_IQR_MULTIPLIER: f64 = 1.5;

/// Default minimum number of numeric values for outlier detection.
pub const DEFAULT_MIN_VALUES: usize = 4;

/// Deserialize raw JSON records, naming the offending rule on failure.
fn parse_records(records: Vec<Value>) -> Result<Vec<ValidationRuleConfig>> {
    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            let name = match record.get("rule_name").and_then(Value::as_str) {
                Some(name) => name.to_string(),
                None => format!("#{}", index + 1),
            };
            ValidationRuleConfig::deserialize(record)
                .map_err(|e| SieveError::rule(name, e.to_string()))
        })
        .collect()
}

// =============================================================================
// COMPILATION
// =============================================================================

/// Typed access to a rule's parameter map.
struct Params<'a> {
    rule: &'a str,
    map: &'a IndexMap<String, Value>,
}

impl<'a> Params<'a> {
    fn error(&self, message: impl Into<String>) -> SieveError {
        SieveError::rule(self.rule, message)
    }

    fn str(&self, key: &str) -> Result<Option<&'a str>> {
        match self.map.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) if !s.trim().is_empty() => Ok(Some(s.as_str())),
            Some(_) => Err(self.error(format!("'{}' must be a non-empty string", key))),
        }
    }

    fn f64(&self, key: &str) -> Result<Option<f64>> {
        match self.map.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(v) => v
                .as_f64()
                .filter(|n| n.is_finite())
                .map(Some)
                .ok_or_else(|| self.error(format!("'{}' must be a finite number", key))),
        }
    }

    fn usize(&self, key: &str) -> Result<Option<usize>> {
        match self.map.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(v) => v
                .as_u64()
                .and_then(|n| usize::try_from(n).ok())
                .map(Some)
                .ok_or_else(|| self.error(format!("'{}' must be a non-negative integer", key))),
        }
    }

    fn bool(&self, key: &str) -> Result<Option<bool>> {
        match self.map.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(_) => Err(self.error(format!("'{}' must be a boolean", key))),
        }
    }

    fn str_list(&self, key: &str) -> Result<Option<Vec<String>>> {
        match self.map.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Array(items)) if !items.is_empty() => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s.clone()),
                    _ => Err(self.error(format!("'{}' must contain only strings", key))),
                })
                .collect::<Result<Vec<_>>>()
                .map(Some),
            Some(_) => Err(self.error(format!("'{}' must be a non-empty list of strings", key))),
        }
    }

    fn column(&self) -> Result<Option<String>> {
        Ok(self.str("column")?.map(str::to_string))
    }

    fn required_column(&self) -> Result<String> {
        self.column()?
            .ok_or_else(|| self.error("'column' is required"))
    }
}

fn compile(config: &ValidationRuleConfig) -> Result<Rule> {
    let params = Params {
        rule: &config.rule_name,
        map: &config.parameters,
    };

    let allowed = config.rule_type.allowed_parameters();
    if let Some(unknown) = config
        .parameters
        .keys()
        .find(|k| k.as_str() != "severity" && !allowed.contains(&k.as_str()))
    {
        return Err(params.error(format!("unknown parameter '{}'", unknown)));
    }

    let kind = match config.rule_type {
        RuleType::MissingValue => {
            let threshold = params.f64("threshold")?;
            if threshold.is_some_and(|t| !(0.0..=1.0).contains(&t)) {
                return Err(params.error("'threshold' must be within [0, 1]"));
            }
            RuleKind::MissingValue {
                column: params.column()?,
                threshold,
            }
        }
        RuleType::DuplicateRow => RuleKind::DuplicateRow {
            columns: params.str_list("columns")?,
        },
        RuleType::TypeMismatch => {
            let column = params.column()?;
            let expected = match params.str("expected_type")? {
                None => None,
                Some("integer") => Some(ColumnType::Integer),
                Some("float") => Some(ColumnType::Float),
                Some("boolean") => Some(ColumnType::Boolean),
                Some("date") => Some(ColumnType::Date),
                Some(other) => {
                    return Err(params.error(format!(
                        "unsupported expected_type '{}' (expected integer, float, boolean or date)",
                        other
                    )));
                }
            };
            if expected.is_some() && column.is_none() {
                return Err(params.error("'expected_type' requires 'column'"));
            }
            RuleKind::TypeMismatch { column, expected }
        }
        RuleType::FormatViolation => {
            let column = params.column()?;
            let format = match params.str("format")? {
                None => None,
                Some(name) => Some(Format::parse(name).ok_or_else(|| {
                    params.error(format!(
                        "unsupported format '{}' (expected email, phone or date)",
                        name
                    ))
                })?),
            };
            let format = match (&column, format) {
                (Some(_), Some(f)) => Some(f),
                (Some(col), None) => Some(Format::for_column_name(col).ok_or_else(|| {
                    params.error(format!("column '{}' does not designate a format", col))
                })?),
                (None, Some(_)) => return Err(params.error("'format' requires 'column'")),
                (None, None) => None,
            };
            RuleKind::FormatViolation {
                column,
                format,
                required: params.bool("required")?.unwrap_or(false),
            }
        }
        RuleType::RangeViolation => {
            let column = params.required_column()?;
            let min = params.f64("min")?;
            let max = params.f64("max")?;
            match (min, max) {
                (None, None) => return Err(params.error("at least one of 'min' or 'max' is required")),
                (Some(lo), Some(hi)) if lo > hi => {
                    return Err(params.error(format!("'min' ({}) is greater than 'max' ({})", lo, hi)));
                }
                _ => {}
            }
            RuleKind::RangeViolation { column, min, max }
        }
        RuleType::Outlier => {
            let multiplier = params.f64("multiplier")?.unwrap_or(DEFAULT_IQR_MULTIPLIER);
            if multiplier <= 0.0 {
                return Err(params.error("'multiplier' must be positive"));
            }
            let min_values = params.usize("min_values")?.unwrap_or(DEFAULT_MIN_VALUES);
            if min_values == 0 {
                return Err(params.error("'min_values' must be at least 1"));
            }
            RuleKind::Outlier {
                column: params.column()?,
                multiplier,
                min_values,
            }
        }
        RuleType::Custom => {
            let column = params.required_column()?;
            let check = match (params.str("pattern")?, params.str_list("allowed_values")?) {
                (Some(pattern), None) => CustomCheck::Pattern(
                    Regex::new(pattern)
                        .map_err(|e| params.error(format!("invalid pattern: {}", e)))?,
                ),
                (None, Some(values)) => CustomCheck::AllowedValues(values),
                _ => {
                    return Err(params.error("exactly one of 'pattern' or 'allowed_values' is required"));
                }
            };
            RuleKind::Custom { column, check }
        }
    };

    let mut rule = Rule::new(&config.rule_name, kind);
    if let Some(name) = params.str("severity")? {
        rule.severity = Severity::parse(name).ok_or_else(|| {
            params.error(format!("unsupported severity '{}' (expected low, medium or high)", name))
        })?;
    }
    rule.enabled = config.enabled;

    Ok(rule)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn compile_one(config: ValidationRuleConfig) -> Result<Rule> {
        RuleSet::from_configs(&[config]).map(|set| set.rules()[0].clone())
    }

    fn assert_invalid(config: ValidationRuleConfig, needle: &str) {
        match compile_one(config) {
            Err(SieveError::InvalidRuleConfig { message, .. }) => {
                assert!(message.contains(needle), "unexpected message: {}", message)
            }
            other => panic!("expected InvalidRuleConfig, got {:?}", other),
        }
    }

    #[test]
    fn test_default_rules() {
        let rules = RuleSet::default_rules();
        let categories: Vec<_> = rules.rules().iter().map(|r| r.kind.category()).collect();
        assert_eq!(
            categories,
            vec![
                IssueCategory::MissingValue,
                IssueCategory::DuplicateRow,
                IssueCategory::TypeMismatch,
                IssueCategory::FormatViolation,
                IssueCategory::Outlier,
            ]
        );
        assert!(rules.enabled().count() == rules.len());
    }

    #[test]
    fn test_range_min_greater_than_max() {
        let config = ValidationRuleConfig::new("age_range", RuleType::RangeViolation)
            .with_param("column", "age")
            .with_param("min", 10)
            .with_param("max", 5);
        assert_invalid(config, "greater than");
    }

    #[test]
    fn test_range_requires_bound() {
        let config =
            ValidationRuleConfig::new("age_range", RuleType::RangeViolation).with_param("column", "age");
        assert_invalid(config, "at least one");
    }

    #[test]
    fn test_unknown_parameter() {
        let config = ValidationRuleConfig::new("m", RuleType::MissingValue).with_param("limit", 3);
        assert_invalid(config, "unknown parameter 'limit'");
    }

    #[test]
    fn test_threshold_bounds() {
        let config = ValidationRuleConfig::new("m", RuleType::MissingValue).with_param("threshold", 1.5);
        assert_invalid(config, "threshold");
    }

    #[test]
    fn test_duplicate_rule_names() {
        let a = ValidationRuleConfig::new("r", RuleType::MissingValue);
        let b = ValidationRuleConfig::new("r", RuleType::DuplicateRow);
        let err = RuleSet::from_configs(&[a, b]).unwrap_err();
        assert!(err.to_string().contains("duplicate rule name"));
    }

    #[test]
    fn test_severity_override() {
        let rule = compile_one(
            ValidationRuleConfig::new("o", RuleType::Outlier).with_param("severity", "high"),
        )
        .unwrap();
        assert_eq!(rule.severity, Severity::High);

        let config = ValidationRuleConfig::new("o", RuleType::Outlier).with_param("severity", "urgent");
        assert_invalid(config, "unsupported severity");
    }

    #[test]
    fn test_format_resolved_from_column_name() {
        let rule = compile_one(
            ValidationRuleConfig::new("f", RuleType::FormatViolation).with_param("column", "work_email"),
        )
        .unwrap();
        assert!(matches!(
            rule.kind,
            RuleKind::FormatViolation {
                format: Some(Format::Email),
                required: false,
                ..
            }
        ));

        let config =
            ValidationRuleConfig::new("f", RuleType::FormatViolation).with_param("column", "name");
        assert_invalid(config, "does not designate a format");
    }

    #[test]
    fn test_custom_rule_needs_exactly_one_check() {
        let both = ValidationRuleConfig::new("c", RuleType::Custom)
            .with_param("column", "status")
            .with_param("pattern", "^[A-Z]+$")
            .with_param("allowed_values", json!(["A"]));
        assert_invalid(both, "exactly one");

        let bad_regex = ValidationRuleConfig::new("c", RuleType::Custom)
            .with_param("column", "status")
            .with_param("pattern", "([");
        assert_invalid(bad_regex, "invalid pattern");
    }

    #[test]
    fn test_outlier_parameters() {
        let rule = compile_one(
            ValidationRuleConfig::new("o", RuleType::Outlier)
                .with_param("multiplier", 3.0)
                .with_param("min_values", 10),
        )
        .unwrap();
        assert!(matches!(
            rule.kind,
            RuleKind::Outlier {
                multiplier,
                min_values: 10,
                column: None,
            } if multiplier == 3.0
        ));

        let config = ValidationRuleConfig::new("o", RuleType::Outlier).with_param("multiplier", 0);
        assert_invalid(config, "positive");
    }

    #[test]
    fn test_from_json_str() {
        let json = r#"[
            {"rule_name": "req_email", "rule_type": "format_violation",
             "parameters": {"column": "email", "required": true}},
            {"rule_name": "age", "rule_type": "range_violation", "enabled": false,
             "parameters": {"column": "age", "min": 0, "max": 120}}
        ]"#;
        let set = RuleSet::from_json_str(json).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.enabled().count(), 1);
        assert!(!set.rules()[1].enabled);
    }

    #[test]
    fn test_unknown_rule_type_is_invalid_config() {
        let err = RuleSet::from_json_str(r#"[{"rule_name": "x", "rule_type": "magic"}]"#).unwrap_err();
        assert!(matches!(
            err,
            SieveError::InvalidRuleConfig { ref rule, ref message }
                if rule == "x" && message.contains("magic")
        ));
    }

    #[test]
    fn test_malformed_records_are_invalid_config() {
        let err = RuleSet::from_json_str(
            r#"[{"rule_name": "m", "rule_type": "missing_value", "enabled": "yes"}]"#,
        )
        .unwrap_err();
        assert!(matches!(err, SieveError::InvalidRuleConfig { ref rule, .. } if rule == "m"));

        let err = RuleSet::from_json_str(
            r#"[{"rule_name": "ok", "rule_type": "outlier"}, {"rule_type": "outlier"}]"#,
        )
        .unwrap_err();
        assert!(matches!(err, SieveError::InvalidRuleConfig { ref rule, .. } if rule == "#2"));
    }

    #[test]
    fn test_non_array_json_is_a_parse_error() {
        let err = RuleSet::from_json_str(r#"{"rule_name": "x"}"#).unwrap_err();
        assert!(matches!(err, SieveError::Json(_)));
    }
}
