//! Issue types for detected data quality defects.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of defect an issue reports.
///
/// Variant order is the order rules execute in and the order issues are
/// reported in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCategory {
    /// A cell holds the missing marker, or a column is too sparse.
    MissingValue,
    /// A row repeats an earlier row.
    DuplicateRow,
    /// A value does not parse under its column's type.
    TypeMismatch,
    /// A value does not match its column's format (email, phone, date, custom).
    FormatViolation,
    /// A numeric value falls outside its configured range.
    RangeViolation,
    /// A numeric value lies outside the IQR fences.
    Outlier,
    /// A configured rule could not be applied. Not scored.
    RuleSkipped,
}

impl IssueCategory {
    /// The six scored categories, in execution order.
    pub const SCORED: [IssueCategory; 6] = [
        IssueCategory::MissingValue,
        IssueCategory::DuplicateRow,
        IssueCategory::TypeMismatch,
        IssueCategory::FormatViolation,
        IssueCategory::RangeViolation,
        IssueCategory::Outlier,
    ];

    /// Position in the execution order.
    pub fn rank(&self) -> u8 {
        *self as u8
    }

    /// Severity used when a rule does not override it.
    pub fn default_severity(&self) -> Severity {
        match self {
            IssueCategory::MissingValue | IssueCategory::FormatViolation => Severity::Medium,
            IssueCategory::DuplicateRow | IssueCategory::TypeMismatch => Severity::High,
            IssueCategory::RangeViolation | IssueCategory::Outlier | IssueCategory::RuleSkipped => {
                Severity::Low
            }
        }
    }

    /// Whether issues of this category count towards the readiness score.
    pub fn is_scored(&self) -> bool {
        *self != IssueCategory::RuleSkipped
    }

    /// Snake-case name as used in configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueCategory::MissingValue => "missing_value",
            IssueCategory::DuplicateRow => "duplicate_row",
            IssueCategory::TypeMismatch => "type_mismatch",
            IssueCategory::FormatViolation => "format_violation",
            IssueCategory::RangeViolation => "range_violation",
            IssueCategory::Outlier => "outlier",
            IssueCategory::RuleSkipped => "rule_skipped",
        }
    }

    /// Get a human-readable label for the category.
    pub fn label(&self) -> &'static str {
        match self {
            IssueCategory::MissingValue => "Missing Value",
            IssueCategory::DuplicateRow => "Duplicate Row",
            IssueCategory::TypeMismatch => "Type Mismatch",
            IssueCategory::FormatViolation => "Format Violation",
            IssueCategory::RangeViolation => "Range Violation",
            IssueCategory::Outlier => "Outlier",
            IssueCategory::RuleSkipped => "Rule Skipped",
        }
    }
}

impl fmt::Display for IssueCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity level of an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    /// Get a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
        }
    }

    /// Parse a lowercase severity name.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "low" => Some(Severity::Low),
            "medium" => Some(Severity::Medium),
            "high" => Some(Severity::High),
            _ => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        })
    }
}

/// A single detected data quality defect.
///
/// `row` is zero-based; messages render rows one-based.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub severity: Severity,
    pub category: IssueCategory,
    /// Affected column, absent for row- and dataset-scoped issues.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub column: Option<String>,
    /// Affected row, absent for column- and dataset-scoped issues.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub row: Option<usize>,
    pub message: String,
    /// Name of the rule that raised the issue.
    pub rule: String,
}

impl Issue {
    /// Create a new issue with the category's default severity.
    pub fn new(category: IssueCategory, message: impl Into<String>) -> Self {
        Self {
            severity: category.default_severity(),
            category,
            column: None,
            row: None,
            message: message.into(),
            rule: String::new(),
        }
    }

    /// Set the severity.
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Set the affected column.
    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    /// Set the affected row.
    pub fn with_row(mut self, row: usize) -> Self {
        self.row = Some(row);
        self
    }

    /// Set the originating rule name.
    pub fn with_rule(mut self, rule: impl Into<String>) -> Self {
        self.rule = rule.into();
        self
    }
}
