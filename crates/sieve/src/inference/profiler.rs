//! Column profiling: type inference and summary statistics.

use std::collections::HashSet;

use tracing::debug;

use super::values;
use crate::config::ProfilerConfig;
use crate::input::Dataset;
use crate::schema::{ColumnProfile, ColumnType, NumericStatistics};

// =============================================================================
// STREAMING STATISTICS
// =============================================================================
// Welford's online algorithm for mean and variance in a single pass. Sorted
// values are retained for exact quartiles.

#[derive(Debug, Clone, Default)]
struct StreamingStats {
    count: usize,
    mean: f64,
    m2: f64,
    values: Vec<f64>,
}

impl StreamingStats {
    fn add(&mut self, value: f64) {
        self.count += 1;

        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        let delta2 = value - self.mean;
        self.m2 += delta * delta2;

        self.values.push(value);
    }

    /// Sample variance (n - 1 denominator).
    fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    fn finish(mut self) -> Option<NumericStatistics> {
        if self.count == 0 {
            return None;
        }

        self.values.sort_by(f64::total_cmp);
        let sorted = &self.values;

        Some(NumericStatistics {
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            mean: self.mean,
            std: self.variance().sqrt(),
            median: percentile(sorted, 0.5),
            q1: percentile(sorted, 0.25),
            q3: percentile(sorted, 0.75),
            count: self.count,
        })
    }
}

/// Percentile of sorted, non-empty data by linear interpolation between
/// closest ranks.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    let pos = p * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let weight = pos - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * weight
}

// =============================================================================
// PROFILER
// =============================================================================

/// Computes a [`ColumnProfile`] for every column of a dataset.
#[derive(Debug, Clone, Default)]
pub struct ColumnProfiler {
    config: ProfilerConfig,
}

impl ColumnProfiler {
    /// Create a profiler with default thresholds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a profiler with custom thresholds.
    pub fn with_config(config: ProfilerConfig) -> Self {
        Self { config }
    }

    /// Profile every column, preserving column order.
    pub fn profile(&self, dataset: &Dataset) -> Vec<ColumnProfile> {
        (0..dataset.column_count())
            .map(|idx| self.profile_column(dataset, idx))
            .collect()
    }

    /// Profile a single column by position.
    pub fn profile_column(&self, dataset: &Dataset, index: usize) -> ColumnProfile {
        let name = dataset.columns()[index].clone();
        let mut profile = ColumnProfile::new(name, index);

        let present: Vec<&str> = dataset.column_values(index).flatten().collect();
        profile.count = dataset.row_count();
        profile.null_count = profile.count - present.len();
        profile.distinct_count = present
            .iter()
            .map(|v| v.trim())
            .collect::<HashSet<_>>()
            .len();

        let (inferred, dominant) = self.infer_type(&present);
        profile.inferred_type = inferred;
        profile.dominant_type = dominant;

        if profile.effective_type().is_numeric() {
            let mut stats = StreamingStats::default();
            for n in present.iter().filter_map(|v| values::parse_number(v)) {
                stats.add(n);
            }
            profile.numeric = stats.finish();
        }

        debug!(
            column = %profile.name,
            inferred_type = %profile.inferred_type,
            dominant_type = ?profile.dominant_type,
            nulls = profile.null_count,
            distinct = profile.distinct_count,
            "profiled column"
        );

        profile
    }

    /// Infer a column type from its non-missing values.
    ///
    /// Returns the inferred type and, for string columns, the typed majority
    /// when one exceeds the mixed-type threshold.
    fn infer_type(&self, present: &[&str]) -> (ColumnType, Option<ColumnType>) {
        if present.is_empty() {
            return (ColumnType::Unknown, None);
        }

        let total = present.len() as f64;
        let numeric: Vec<&str> = present
            .iter()
            .copied()
            .filter(|v| values::parse_number(v).is_some())
            .collect();
        let numeric_ratio = numeric.len() as f64 / total;
        let numeric_type = if numeric.iter().all(|v| values::is_integer(v)) {
            ColumnType::Integer
        } else {
            ColumnType::Float
        };

        if numeric_ratio >= self.config.type_threshold {
            return (numeric_type, None);
        }

        if present.iter().all(|v| values::is_boolean(v)) {
            return (ColumnType::Boolean, None);
        }

        let date_ratio =
            present.iter().filter(|v| values::is_date(v)).count() as f64 / total;
        if date_ratio >= self.config.type_threshold {
            return (ColumnType::Date, None);
        }

        let dominant = if numeric_ratio > self.config.mixed_type_threshold {
            Some(numeric_type)
        } else if date_ratio > self.config.mixed_type_threshold {
            Some(ColumnType::Date)
        } else {
            None
        };

        (ColumnType::String, dominant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(column: &str, values: &[&str]) -> Dataset {
        let rows: Vec<Vec<&str>> = values.iter().map(|v| vec![*v]).collect();
        Dataset::from_strings(&[column], &rows).unwrap()
    }

    fn profile_of(values: &[&str]) -> ColumnProfile {
        ColumnProfiler::new().profile_column(&dataset("col", values), 0)
    }

    #[test]
    fn test_integer_column() {
        let profile = profile_of(&["1", "2", "3", ""]);
        assert_eq!(profile.inferred_type, ColumnType::Integer);
        assert_eq!(profile.count, 4);
        assert_eq!(profile.null_count, 1);
        assert_eq!(profile.distinct_count, 3);

        let stats = profile.numeric.unwrap();
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 3.0);
        assert_eq!(stats.mean, 2.0);
        assert!((stats.std - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_float_column() {
        let profile = profile_of(&["1", "2.5", "3"]);
        assert_eq!(profile.inferred_type, ColumnType::Float);
    }

    #[test]
    fn test_boolean_column() {
        let profile = profile_of(&["yes", "No", "Y", "false"]);
        assert_eq!(profile.inferred_type, ColumnType::Boolean);
        assert!(profile.numeric.is_none());
    }

    #[test]
    fn test_date_column() {
        let profile = profile_of(&["2024-01-01", "2024-02-01", "2024-03-01"]);
        assert_eq!(profile.inferred_type, ColumnType::Date);
    }

    #[test]
    fn test_mostly_numeric_column_has_dominant_type() {
        let profile = profile_of(&["30", "27", "not_a_number", "45", ""]);
        assert_eq!(profile.inferred_type, ColumnType::String);
        assert_eq!(profile.dominant_type, Some(ColumnType::Integer));
        assert_eq!(profile.effective_type(), ColumnType::Integer);
        assert_eq!(profile.numeric.as_ref().map(|s| s.count), Some(3));
    }

    #[test]
    fn test_text_column_has_no_dominant_type() {
        let profile = profile_of(&["alice", "bob", "3"]);
        assert_eq!(profile.inferred_type, ColumnType::String);
        assert_eq!(profile.dominant_type, None);
    }

    #[test]
    fn test_all_missing_is_unknown() {
        let profile = profile_of(&["", "NA"]);
        assert_eq!(profile.inferred_type, ColumnType::Unknown);
        assert_eq!(profile.null_count, 2);
        assert!(profile.numeric.is_none());
    }

    #[test]
    fn test_zero_rows_yield_empty_profiles() {
        let ds = Dataset::new(vec!["a".into(), "b".into()], Vec::new()).unwrap();
        let profiles = ColumnProfiler::new().profile(&ds);
        assert_eq!(profiles.len(), 2);
        assert_eq!(profiles[1].name, "b");
        assert_eq!(profiles[1].count, 0);
        assert_eq!(profiles[1].inferred_type, ColumnType::Unknown);
    }

    #[test]
    fn test_quartiles_interpolate() {
        let stats = profile_of(&["10", "11", "9", "10", "12", "1000"])
            .numeric
            .unwrap();
        assert_eq!(stats.q1, 10.0);
        assert_eq!(stats.q3, 11.75);
        assert_eq!(stats.median, 10.5);
    }
}
