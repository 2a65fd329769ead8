//! CLI command implementations.

pub mod batch;
pub mod check;
pub mod compare;
pub mod history;
pub mod trend;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use colored::{ColoredString, Colorize};
use serde::Serialize;
use sieve::{EngineConfig, ReadinessLevel, RuleSet, Trend};

/// Load a rule set, or the built-in rules when no file is given.
pub fn load_rules(path: Option<&Path>) -> sieve::Result<RuleSet> {
    match path {
        Some(p) => RuleSet::from_json_file(p),
        None => Ok(RuleSet::default_rules()),
    }
}

/// Load engine configuration, or the defaults when no file is given.
pub fn load_config(path: Option<&Path>) -> sieve::Result<EngineConfig> {
    match path {
        Some(p) => EngineConfig::from_json_file(p),
        None => Ok(EngineConfig::default()),
    }
}

/// Write a value as pretty JSON, failing if any byte does not reach the file.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), Box<dyn std::error::Error>> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}

pub fn colored_level(level: ReadinessLevel) -> ColoredString {
    let text = level.to_string();
    match level {
        ReadinessLevel::Excellent => text.green().bold(),
        ReadinessLevel::Good => text.green(),
        ReadinessLevel::Fair => text.yellow(),
        ReadinessLevel::Poor => text.red().bold(),
    }
}

pub fn colored_trend(trend: Trend) -> ColoredString {
    let text = trend.to_string();
    match trend {
        Trend::Improving => text.green().bold(),
        Trend::Degrading => text.red().bold(),
        Trend::Stable => text.blue(),
    }
}
