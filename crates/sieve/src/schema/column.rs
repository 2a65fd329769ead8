//! Column profile and statistics.

use serde::{Deserialize, Serialize};

use super::types::ColumnType;

/// Statistics for numeric columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericStatistics {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Sample standard deviation (0 for fewer than two values).
    pub std: f64,
    pub median: f64,
    /// First quartile (25th percentile).
    pub q1: f64,
    /// Third quartile (75th percentile).
    pub q3: f64,
    /// Number of values the statistics were computed over.
    pub count: usize,
}

impl NumericStatistics {
    /// Calculate the interquartile range.
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }

    /// Lower and upper IQR fences for the given multiplier.
    pub fn iqr_bounds(&self, multiplier: f64) -> (f64, f64) {
        let iqr = self.iqr();
        (self.q1 - multiplier * iqr, self.q3 + multiplier * iqr)
    }
}

/// Profile of a single column, computed once per validation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnProfile {
    /// Column name.
    pub name: String,
    /// Zero-based position in the dataset.
    pub position: usize,
    /// Inferred data type.
    pub inferred_type: ColumnType,
    /// Typed majority of a column that fell short of the inference
    /// threshold, e.g. a mostly numeric column with a few stray strings.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub dominant_type: Option<ColumnType>,
    /// Total number of values (including missing).
    pub count: usize,
    /// Number of missing values.
    pub null_count: usize,
    /// Number of distinct non-missing values.
    pub distinct_count: usize,
    /// Numeric statistics (numeric columns only).
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub numeric: Option<NumericStatistics>,
}

impl ColumnProfile {
    /// Create an empty profile (no values seen).
    pub fn new(name: impl Into<String>, position: usize) -> Self {
        Self {
            name: name.into(),
            position,
            inferred_type: ColumnType::Unknown,
            dominant_type: None,
            count: 0,
            null_count: 0,
            distinct_count: 0,
            numeric: None,
        }
    }

    /// The type values are checked against.
    ///
    /// This is the inferred type, or the dominant type when the column was
    /// inferred as a string only because of a minority of unparseable values.
    pub fn effective_type(&self) -> ColumnType {
        match (self.inferred_type, self.dominant_type) {
            (ColumnType::String, Some(dominant)) => dominant,
            (inferred, _) => inferred,
        }
    }

    /// Fraction of values that are missing (0 for an empty column).
    pub fn null_ratio(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.null_count as f64 / self.count as f64
        }
    }

    /// Get the null percentage.
    pub fn null_percentage(&self) -> f64 {
        self.null_ratio() * 100.0
    }
}
