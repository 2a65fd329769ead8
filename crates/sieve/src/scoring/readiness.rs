//! ML readiness scoring.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::config::ScoringConfig;
use crate::validation::{Issue, IssueCategory, Severity};

/// Coarse readiness band derived from the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadinessLevel {
    /// Below 50: substantial cleaning needed.
    Poor,
    /// 50-69.
    Fair,
    /// 70-89.
    Good,
    /// 90 and above.
    Excellent,
}

impl ReadinessLevel {
    /// Map a score to its level.
    pub fn from_score(score: u8) -> Self {
        match score {
            s if s >= 90 => Self::Excellent,
            s if s >= 70 => Self::Good,
            s if s >= 50 => Self::Fair,
            _ => Self::Poor,
        }
    }
}

impl fmt::Display for ReadinessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Poor => "poor",
            Self::Fair => "fair",
            Self::Good => "good",
            Self::Excellent => "excellent",
        })
    }
}

/// Fixed recommendation for a scored issue category.
pub fn recommendation(category: IssueCategory) -> Option<&'static str> {
    match category {
        IssueCategory::MissingValue => Some("impute or drop incomplete rows before training"),
        IssueCategory::DuplicateRow => Some("remove duplicate rows so they do not bias training"),
        IssueCategory::TypeMismatch => Some("clean or coerce values that do not match their column type"),
        IssueCategory::FormatViolation => Some("normalize values that violate their expected format"),
        IssueCategory::RangeViolation => Some("correct or clip values outside their valid range"),
        IssueCategory::Outlier => Some("review outliers and cap or transform extreme values"),
        IssueCategory::RuleSkipped => None,
    }
}

/// Score, level and recommendations for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadinessScore {
    pub score: u8,
    pub level: ReadinessLevel,
    pub recommendations: Vec<String>,
}

/// Turns an issue list into a 0-100 readiness score.
#[derive(Debug, Clone, Default)]
pub struct ReadinessScorer {
    config: ScoringConfig,
}

impl ReadinessScorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ScoringConfig) -> Self {
        Self { config }
    }

    /// Deduction for a single issue of the given severity.
    pub fn weight(&self, severity: Severity) -> f64 {
        match severity {
            Severity::High => self.config.high_weight,
            Severity::Medium => self.config.medium_weight,
            Severity::Low => self.config.low_weight,
        }
    }

    /// Score an issue list.
    ///
    /// Each column's cumulative deduction is capped; issues without a column
    /// share one uncapped bucket. Skipped-rule issues are ignored.
    pub fn score(&self, issues: &[Issue]) -> ReadinessScore {
        let mut per_column: IndexMap<&str, f64> = IndexMap::new();
        let mut unscoped = 0.0;

        for issue in issues.iter().filter(|i| i.category.is_scored()) {
            let weight = self.weight(issue.severity);
            match issue.column.as_deref() {
                Some(column) => *per_column.entry(column).or_insert(0.0) += weight,
                None => unscoped += weight,
            }
        }

        let deduction: f64 = per_column
            .values()
            .map(|d| d.min(self.config.column_cap))
            .sum::<f64>()
            + unscoped;

        let score = (100.0 - deduction).clamp(0.0, 100.0).round() as u8;

        ReadinessScore {
            score,
            level: ReadinessLevel::from_score(score),
            recommendations: recommendations(issues),
        }
    }
}

/// One recommendation per category present, in category order.
fn recommendations(issues: &[Issue]) -> Vec<String> {
    IssueCategory::SCORED
        .iter()
        .filter(|c| issues.iter().any(|i| i.category == **c))
        .filter_map(|c| recommendation(*c))
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(category: IssueCategory, column: Option<&str>) -> Issue {
        let issue = Issue::new(category, "test");
        match column {
            Some(c) => issue.with_column(c),
            None => issue,
        }
    }

    #[test]
    fn test_clean_run_is_excellent() {
        let result = ReadinessScorer::new().score(&[]);
        assert_eq!(result.score, 100);
        assert_eq!(result.level, ReadinessLevel::Excellent);
        assert!(result.recommendations.is_empty());
    }

    #[test]
    fn test_severity_weights() {
        let issues = vec![
            issue(IssueCategory::TypeMismatch, Some("a")),
            issue(IssueCategory::MissingValue, Some("b")),
            issue(IssueCategory::Outlier, Some("c")),
        ];
        // 100 - 3 - 1.5 - 0.5
        assert_eq!(ReadinessScorer::new().score(&issues).score, 95);
    }

    #[test]
    fn test_rounding() {
        let issues = vec![issue(IssueCategory::MissingValue, Some("a"))];
        // 98.5 rounds away from zero
        assert_eq!(ReadinessScorer::new().score(&issues).score, 99);
    }

    #[test]
    fn test_column_cap() {
        let issues: Vec<Issue> = (0..50)
            .map(|_| issue(IssueCategory::TypeMismatch, Some("bad")))
            .collect();
        let result = ReadinessScorer::new().score(&issues);
        assert_eq!(result.score, 80);
        assert_eq!(result.level, ReadinessLevel::Good);
    }

    #[test]
    fn test_dataset_scoped_issues_are_uncapped() {
        let issues: Vec<Issue> = (0..20)
            .map(|_| issue(IssueCategory::DuplicateRow, None))
            .collect();
        let result = ReadinessScorer::new().score(&issues);
        assert_eq!(result.score, 40);
        assert_eq!(result.level, ReadinessLevel::Poor);
    }

    #[test]
    fn test_score_clamped_at_zero() {
        let issues: Vec<Issue> = (0..100)
            .map(|_| issue(IssueCategory::DuplicateRow, None))
            .collect();
        assert_eq!(ReadinessScorer::new().score(&issues).score, 0);
    }

    #[test]
    fn test_skipped_rules_are_not_scored() {
        let issues = vec![issue(IssueCategory::RuleSkipped, None)];
        let result = ReadinessScorer::new().score(&issues);
        assert_eq!(result.score, 100);
        assert!(result.recommendations.is_empty());
    }

    #[test]
    fn test_recommendations_ordered_and_deduplicated() {
        let issues = vec![
            issue(IssueCategory::Outlier, Some("x")),
            issue(IssueCategory::MissingValue, Some("y")),
            issue(IssueCategory::Outlier, Some("z")),
        ];
        let result = ReadinessScorer::new().score(&issues);
        assert_eq!(
            result.recommendations,
            vec![
                "impute or drop incomplete rows before training".to_string(),
                "review outliers and cap or transform extreme values".to_string(),
            ]
        );
    }

    #[test]
    fn test_level_boundaries() {
        assert_eq!(ReadinessLevel::from_score(90), ReadinessLevel::Excellent);
        assert_eq!(ReadinessLevel::from_score(89), ReadinessLevel::Good);
        assert_eq!(ReadinessLevel::from_score(70), ReadinessLevel::Good);
        assert_eq!(ReadinessLevel::from_score(69), ReadinessLevel::Fair);
        assert_eq!(ReadinessLevel::from_score(50), ReadinessLevel::Fair);
        assert_eq!(ReadinessLevel::from_score(49), ReadinessLevel::Poor);
    }

    #[test]
    fn test_custom_weights() {
        let scorer = ReadinessScorer::with_config(ScoringConfig {
            high_weight: 10.0,
            ..ScoringConfig::default()
        });
        let issues = vec![issue(IssueCategory::DuplicateRow, None)];
        assert_eq!(scorer.score(&issues).score, 90);
    }
}
