//! Session summaries and the JSON-backed history store.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, SieveError};
use crate::scoring::ReadinessLevel;
use crate::sieve::{SeverityCounts, ValidationResult};

/// Identifier of a recorded validation session.
pub type SessionId = u64;

/// The persisted essentials of one validation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub id: SessionId,
    /// Logical data source, e.g. a file name. Trends only compare sessions of
    /// the same source.
    pub source: String,
    pub created_at: DateTime<Utc>,
    pub rows: usize,
    pub columns: usize,
    pub total_issues: usize,
    pub issues_by_severity: SeverityCounts,
    pub ml_score: u8,
    pub ml_level: ReadinessLevel,
}

impl SessionSummary {
    /// Summarize a validation result. The id is assigned when recorded.
    pub fn from_result(source: impl Into<String>, result: &ValidationResult) -> Self {
        Self {
            id: 0,
            source: source.into(),
            created_at: result.created_at,
            rows: result.rows,
            columns: result.columns,
            total_issues: result.summary.total,
            issues_by_severity: result.summary.by_severity,
            ml_score: result.ml_score,
            ml_level: result.ml_level,
        }
    }
}

/// Read access to recorded sessions.
pub trait SessionHistory {
    /// Look up a session by id.
    fn session(&self, id: SessionId) -> Option<&SessionSummary>;

    /// All sessions in insertion order.
    fn sessions(&self) -> &[SessionSummary];
}

impl SessionHistory for [SessionSummary] {
    fn session(&self, id: SessionId) -> Option<&SessionSummary> {
        self.iter().find(|s| s.id == id)
    }

    fn sessions(&self) -> &[SessionSummary] {
        self
    }
}

impl SessionHistory for Vec<SessionSummary> {
    fn session(&self, id: SessionId) -> Option<&SessionSummary> {
        self.as_slice().session(id)
    }

    fn sessions(&self) -> &[SessionSummary] {
        self
    }
}

/// In-memory session history with JSON persistence.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryStore {
    next_id: SessionId,
    sessions: Vec<SessionSummary>,
}

impl HistoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a validation result and return the new session id.
    pub fn record(&mut self, source: impl Into<String>, result: &ValidationResult) -> SessionId {
        self.insert(SessionSummary::from_result(source, result))
    }

    /// Insert a summary, assigning it the next id.
    pub fn insert(&mut self, mut summary: SessionSummary) -> SessionId {
        self.next_id += 1;
        summary.id = self.next_id;
        debug!(id = summary.id, source = %summary.source, issues = summary.total_issues, "recorded session");
        self.sessions.push(summary);
        self.next_id
    }

    /// Most recent sessions first, at most `limit`.
    pub fn recent(&self, limit: usize) -> Vec<&SessionSummary> {
        let mut sessions: Vec<&SessionSummary> = self.sessions.iter().collect();
        sessions.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        sessions.truncate(limit);
        sessions
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Save the store to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    SieveError::Persistence(format!(
                        "Failed to create directory '{}': {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let file = File::create(path).map_err(|e| {
            SieveError::Persistence(format!("Failed to create file '{}': {}", path.display(), e))
        })?;

        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self).map_err(|e| {
            SieveError::Persistence(format!("Failed to serialize session history: {}", e))
        })?;
        writer.flush().map_err(|e| {
            SieveError::Persistence(format!("Failed to write file '{}': {}", path.display(), e))
        })?;

        Ok(())
    }

    /// Load a store from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let file = File::open(path).map_err(|e| {
            SieveError::Persistence(format!("Failed to open file '{}': {}", path.display(), e))
        })?;

        let store: HistoryStore = serde_json::from_reader(BufReader::new(file)).map_err(|e| {
            SieveError::Persistence(format!(
                "Failed to parse session history '{}': {}",
                path.display(),
                e
            ))
        })?;

        Ok(store)
    }

    /// Load a store, or start an empty one if the file does not exist yet.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::new())
        }
    }
}

impl SessionHistory for HistoryStore {
    fn session(&self, id: SessionId) -> Option<&SessionSummary> {
        self.sessions.session(id)
    }

    fn sessions(&self) -> &[SessionSummary] {
        &self.sessions
    }
}
