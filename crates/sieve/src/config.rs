//! Engine configuration.
//!
//! All thresholds and weights the engine uses are tunable here. Every section
//! falls back to its defaults, so a partial JSON file is enough to override a
//! single value.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SieveError};

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub profiler: ProfilerConfig,
    pub scoring: ScoringConfig,
    pub trend: TrendConfig,
}

/// Type inference thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfilerConfig {
    /// Share of non-missing values that must parse for a column to take a type.
    pub type_threshold: f64,
    /// Share above which a string column records a dominant type.
    pub mixed_type_threshold: f64,
}

impl Default for ProfilerConfig {
    fn default() -> Self {
        Self {
            type_threshold: 0.95,
            mixed_type_threshold: 0.5,
        }
    }
}

/// ML readiness score weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub high_weight: f64,
    pub medium_weight: f64,
    pub low_weight: f64,
    /// Maximum deduction attributable to a single column.
    pub column_cap: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            high_weight: 3.0,
            medium_weight: 1.5,
            low_weight: 0.5,
            column_cap: 20.0,
        }
    }
}

/// Trend classification settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendConfig {
    /// Percentage change at or beyond which a trend is improving/degrading.
    pub threshold_pct: f64,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self { threshold_pct: 5.0 }
    }
}

impl EngineConfig {
    /// Load configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| SieveError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: EngineConfig = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| SieveError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the engine cannot work with.
    pub fn validate(&self) -> Result<()> {
        let p = &self.profiler;
        if !(p.type_threshold > 0.0 && p.type_threshold <= 1.0) {
            return Err(SieveError::Config(
                "profiler type_threshold must be within (0, 1]".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&p.mixed_type_threshold) {
            return Err(SieveError::Config(
                "profiler mixed_type_threshold must be within [0, 1]".to_string(),
            ));
        }
        if p.mixed_type_threshold > p.type_threshold {
            return Err(SieveError::Config(
                "profiler mixed_type_threshold must not exceed type_threshold".to_string(),
            ));
        }

        let s = &self.scoring;
        let weights = [s.high_weight, s.medium_weight, s.low_weight, s.column_cap];
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(SieveError::Config(
                "scoring weights must be finite and non-negative".to_string(),
            ));
        }

        if !self.trend.threshold_pct.is_finite() || self.trend.threshold_pct < 0.0 {
            return Err(SieveError::Config(
                "trend threshold must be finite and non-negative".to_string(),
            ));
        }

        Ok(())
    }
}
