//! In-memory dataset and source metadata.

use std::collections::HashSet;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SieveError};

/// Metadata about a data file that was loaded into a [`Dataset`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceMetadata {
    /// File name without path.
    pub file: String,
    /// Full path to the file.
    pub path: PathBuf,
    /// SHA-256 hash of the file contents.
    pub hash: String,
    /// File size in bytes.
    pub size_bytes: u64,
    /// Detected format (csv, tsv, etc.).
    pub format: String,
    /// Number of data rows (excluding header).
    pub row_count: usize,
    /// Number of columns.
    pub column_count: usize,
    /// When the file was loaded.
    pub loaded_at: DateTime<Utc>,
}

impl SourceMetadata {
    /// Create metadata for a file that has been loaded.
    pub fn new(
        path: PathBuf,
        hash: String,
        size_bytes: u64,
        format: String,
        row_count: usize,
        column_count: usize,
    ) -> Self {
        let file = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            file,
            path,
            hash,
            size_bytes,
            format,
            row_count,
            column_count,
            loaded_at: Utc::now(),
        }
    }
}

/// A fully materialized tabular dataset.
///
/// Cells are `Option<String>`: `None` is the explicit missing marker. Row order
/// is significant, it is what row indices in issues refer to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl Dataset {
    /// Build a dataset, rejecting shapes the engine cannot validate.
    ///
    /// Fails with [`SieveError::InvalidDataset`] when there are no columns, when
    /// two columns share a name, or when a row's field count disagrees with
    /// the header.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Result<Self> {
        check_shape(&columns, &rows)?;
        Ok(Self { columns, rows })
    }

    /// Re-check the shape invariants, e.g. after deserializing.
    pub fn validate(&self) -> Result<()> {
        check_shape(&self.columns, &self.rows)
    }

    /// Build a dataset from string cells, treating null tokens as missing.
    pub fn from_strings<S: AsRef<str>>(columns: &[S], rows: &[Vec<S>]) -> Result<Self> {
        let columns = columns.iter().map(|c| c.as_ref().to_string()).collect();
        let rows = rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|v| {
                        let v = v.as_ref();
                        if Dataset::is_null_value(v) {
                            None
                        } else {
                            Some(v.to_string())
                        }
                    })
                    .collect()
            })
            .collect();
        Self::new(columns, rows)
    }

    /// Column names in declaration order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// All rows in order.
    pub fn rows(&self) -> &[Vec<Option<String>>] {
        &self.rows
    }

    /// Get the number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Get the number of rows (excluding header).
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Position of a column by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Get all values for a column by index.
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = Option<&str>> {
        self.rows
            .iter()
            .map(move |row| row.get(index).and_then(|v| v.as_deref()))
    }

    /// Get a specific cell value. `None` for missing cells and out-of-range indices.
    pub fn get(&self, row: usize, col: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .and_then(|v| v.as_deref())
    }

    /// Check if a raw token represents a missing/null value.
    pub fn is_null_value(value: &str) -> bool {
        let trimmed = value.trim();
        trimmed.is_empty()
            || trimmed.eq_ignore_ascii_case("na")
            || trimmed.eq_ignore_ascii_case("n/a")
            || trimmed.eq_ignore_ascii_case("null")
            || trimmed.eq_ignore_ascii_case("none")
            || trimmed.eq_ignore_ascii_case("nil")
            || trimmed == "."
            || trimmed == "-"
    }
}

fn check_shape(columns: &[String], rows: &[Vec<Option<String>>]) -> Result<()> {
    if columns.is_empty() {
        return Err(SieveError::InvalidDataset(
            "dataset has no columns".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for name in columns {
        if !seen.insert(name.as_str()) {
            return Err(SieveError::InvalidDataset(format!(
                "duplicate column name '{}'",
                name
            )));
        }
    }

    for (row_idx, row) in rows.iter().enumerate() {
        if row.len() != columns.len() {
            return Err(SieveError::InvalidDataset(format!(
                "row {} has {} field(s), expected {}",
                row_idx + 1,
                row.len(),
                columns.len()
            )));
        }
    }

    Ok(())
}
