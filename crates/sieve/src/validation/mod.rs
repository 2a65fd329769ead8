//! Rule engine for detecting data quality issues.

mod checks;
mod engine;
mod issue;
mod patterns;
mod rules;

pub use engine::RuleEngine;
pub use issue::{Issue, IssueCategory, Severity};
pub use patterns::Format;
pub use rules::{
    CustomCheck, DEFAULT_IQR_MULTIPLIER, DEFAULT_MIN_VALUES, Rule, RuleKind, RuleSet, RuleType,
    ValidationRuleConfig,
};
