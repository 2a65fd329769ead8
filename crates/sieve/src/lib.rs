//! Sieve: data quality validation and ML-readiness scoring for tabular datasets.
//!
//! Sieve profiles every column of a dataset, runs a configurable set of
//! detection rules over it, and condenses the findings into a 0-100 score
//! that estimates how ready the data is for machine learning. Results can be
//! recorded as sessions and compared over time.
//!
//! # Pipeline
//!
//! - [`ColumnProfiler`] infers a type and summary statistics per column
//! - [`RuleEngine`] applies a compiled [`RuleSet`] and emits ordered [`Issue`]s
//! - [`ReadinessScorer`] turns issues into a score, level and recommendations
//! - [`SessionComparator`] classifies quality trends across recorded sessions
//!
//! # Example
//!
//! ```no_run
//! use sieve::{RuleSet, Sieve};
//!
//! let sieve = Sieve::new();
//! let (result, source) = sieve.validate_file("customers.csv", &RuleSet::default_rules()).unwrap();
//!
//! println!("{}: {} issues, score {}", source.file, result.issues.len(), result.ml_score);
//! ```

pub mod config;
pub mod error;
pub mod history;
pub mod inference;
pub mod input;
pub mod schema;
pub mod scoring;
pub mod validation;

mod sieve;

pub use crate::sieve::{IssueSummary, SeverityCounts, Sieve, ValidationResult};
pub use config::{EngineConfig, ProfilerConfig, ScoringConfig, TrendConfig};
pub use error::{Result, SieveError};
pub use history::{
    ComparisonResult, HistoryStore, SessionComparator, SessionHistory, SessionId, SessionSummary,
    Trend, TrendResult,
};
pub use inference::ColumnProfiler;
pub use input::{Dataset, Parser, ParserConfig, SourceMetadata};
pub use schema::{ColumnProfile, ColumnType, NumericStatistics};
pub use scoring::{ReadinessLevel, ReadinessScore, ReadinessScorer, ReadinessSummary};
pub use validation::{
    Issue, IssueCategory, RuleEngine, RuleSet, RuleType, Severity, ValidationRuleConfig,
};
