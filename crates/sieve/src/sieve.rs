//! Main Sieve struct and public API.

use std::path::Path;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::config::EngineConfig;
use crate::error::Result;
use crate::inference::ColumnProfiler;
use crate::input::{Dataset, Parser, ParserConfig, SourceMetadata};
use crate::schema::ColumnProfile;
use crate::scoring::{ReadinessLevel, ReadinessScorer, ReadinessSummary};
use crate::validation::{Issue, IssueCategory, RuleEngine, RuleSet, Severity};

/// Issue counts by severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityCounts {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl SeverityCounts {
    pub fn total(&self) -> usize {
        self.high + self.medium + self.low
    }
}

/// Summary counts over a run's issues.
///
/// Skipped rules are counted separately and excluded from `total`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IssueSummary {
    pub total: usize,
    pub by_severity: SeverityCounts,
    /// Counts for every scored category, in execution order.
    pub by_category: IndexMap<IssueCategory, usize>,
    pub skipped_rules: usize,
    /// Number of columns with at least one scored issue.
    pub columns_with_issues: usize,
}

impl IssueSummary {
    pub fn from_issues(issues: &[Issue]) -> Self {
        let mut summary = Self {
            by_category: IssueCategory::SCORED.iter().map(|c| (*c, 0)).collect(),
            ..Self::default()
        };
        let mut columns = std::collections::HashSet::new();

        for issue in issues {
            if !issue.category.is_scored() {
                summary.skipped_rules += 1;
                continue;
            }

            summary.total += 1;
            match issue.severity {
                Severity::High => summary.by_severity.high += 1,
                Severity::Medium => summary.by_severity.medium += 1,
                Severity::Low => summary.by_severity.low += 1,
            }
            *summary.by_category.entry(issue.category).or_insert(0) += 1;
            if let Some(column) = &issue.column {
                columns.insert(column.as_str());
            }
        }

        summary.columns_with_issues = columns.len();
        summary
    }
}

/// Result of validating one dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Number of data rows.
    pub rows: usize,
    /// Number of columns.
    pub columns: usize,
    /// One profile per column, in column order.
    pub profiles: Vec<ColumnProfile>,
    /// Detected issues in deterministic order.
    pub issues: Vec<Issue>,
    pub summary: IssueSummary,
    /// ML readiness score (0-100).
    pub ml_score: u8,
    pub ml_level: ReadinessLevel,
    pub recommendations: Vec<String>,
    /// Column-kind counts and missingness behind the score.
    pub readiness_summary: ReadinessSummary,
    pub created_at: DateTime<Utc>,
}

/// The validation engine: profiler, rule engine and scorer under one
/// configuration.
///
/// A `Sieve` holds no per-run state and can be shared across threads.
#[derive(Debug, Clone, Default)]
pub struct Sieve {
    config: EngineConfig,
    profiler: ColumnProfiler,
    engine: RuleEngine,
    scorer: ReadinessScorer,
}

impl Sieve {
    /// Create an engine with default configuration.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Create an engine with custom configuration.
    pub fn with_config(config: EngineConfig) -> Self {
        let profiler = ColumnProfiler::with_config(config.profiler.clone());
        let scorer = ReadinessScorer::with_config(config.scoring.clone());

        Self {
            config,
            profiler,
            engine: RuleEngine::new(),
            scorer,
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Validate a dataset against a rule set.
    ///
    /// # Example
    ///
    /// ```
    /// use sieve::{Dataset, RuleSet, Sieve};
    ///
    /// let dataset = Dataset::from_strings(&["id", "age"], &[vec!["1", "30"], vec!["2", ""]]).unwrap();
    /// let result = Sieve::new().validate(&dataset, &RuleSet::default_rules()).unwrap();
    ///
    /// assert_eq!(result.issues.len(), 1);
    /// assert!(result.ml_score <= 100);
    /// ```
    #[instrument(
        skip_all,
        fields(rows = dataset.row_count(), columns = dataset.column_count(), rules = rules.len())
    )]
    pub fn validate(&self, dataset: &Dataset, rules: &RuleSet) -> Result<ValidationResult> {
        dataset.validate()?;

        let profiles = self.profiler.profile(dataset);
        let issues = self.engine.evaluate(dataset, &profiles, rules);
        let readiness = self.scorer.score(&issues);
        let summary = IssueSummary::from_issues(&issues);
        let readiness_summary = ReadinessSummary::from_profiles(dataset.row_count(), &profiles);

        info!(
            issues = summary.total,
            skipped_rules = summary.skipped_rules,
            score = readiness.score,
            level = %readiness.level,
            "validation complete"
        );

        Ok(ValidationResult {
            rows: dataset.row_count(),
            columns: dataset.column_count(),
            profiles,
            issues,
            summary,
            ml_score: readiness.score,
            ml_level: readiness.level,
            recommendations: readiness.recommendations,
            readiness_summary,
            created_at: Utc::now(),
        })
    }

    /// Load a delimited file and validate it.
    pub fn validate_file(
        &self,
        path: impl AsRef<Path>,
        rules: &RuleSet,
    ) -> Result<(ValidationResult, SourceMetadata)> {
        self.validate_file_with(path, rules, ParserConfig::default())
    }

    /// Load a delimited file with explicit parser settings and validate it.
    pub fn validate_file_with(
        &self,
        path: impl AsRef<Path>,
        rules: &RuleSet,
        parser: ParserConfig,
    ) -> Result<(ValidationResult, SourceMetadata)> {
        let (dataset, metadata) = Parser::with_config(parser).parse_file(path)?;
        let result = self.validate(&dataset, rules)?;
        Ok((result, metadata))
    }
}
