//! Error types for the Sieve library.

use std::path::PathBuf;
use thiserror::Error;

use crate::history::SessionId;

/// Main error type for Sieve operations.
#[derive(Debug, Error)]
pub enum SieveError {
    /// The dataset cannot be validated (no columns, ragged rows, duplicate headers).
    #[error("Invalid dataset: {0}")]
    InvalidDataset(String),

    /// A rule configuration is malformed. Raised while compiling a rule set,
    /// never during a scan.
    #[error("Invalid rule config '{rule}': {message}")]
    InvalidRuleConfig { rule: String, message: String },

    /// A referenced validation session does not exist.
    #[error("Session not found: {0}")]
    SessionNotFound(SessionId),

    /// No prior sessions fall inside the trend window.
    #[error("Insufficient history for session {session}: no prior sessions in the last {days} day(s)")]
    InsufficientHistory { session: SessionId, days: u32 },

    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Engine configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Session history could not be saved or loaded.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SieveError {
    /// Shorthand for a rule configuration error.
    pub(crate) fn rule(rule: impl Into<String>, message: impl Into<String>) -> Self {
        SieveError::InvalidRuleConfig {
            rule: rule.into(),
            message: message.into(),
        }
    }
}

/// Result type alias for Sieve operations.
pub type Result<T> = std::result::Result<T, SieveError>;
