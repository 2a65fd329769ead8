//! Session comparison and trend classification.

use std::fmt;

use chrono::Duration;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::store::{SessionHistory, SessionId, SessionSummary};
use crate::config::TrendConfig;
use crate::error::{Result, SieveError};

/// Direction of quality change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    /// Fewer issues than the baseline.
    Improving,
    /// More issues than the baseline.
    Degrading,
    Stable,
}

impl Trend {
    /// Classify a percentage change in issue count.
    pub fn classify(change_pct: f64, threshold_pct: f64) -> Self {
        if change_pct <= -threshold_pct {
            Trend::Improving
        } else if change_pct >= threshold_pct {
            Trend::Degrading
        } else {
            Trend::Stable
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Trend::Improving => "improving",
            Trend::Degrading => "degrading",
            Trend::Stable => "stable",
        })
    }
}

/// Per-severity change in issue count between two sessions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityDelta {
    pub high: i64,
    pub medium: i64,
    pub low: i64,
}

/// Baseline (`session1`) versus current (`session2`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub session1: SessionId,
    pub session2: SessionId,
    pub issues_by_severity_change: SeverityDelta,
    pub total_issues_change: i64,
    /// `(issues2 - issues1) / max(issues1, 1) * 100`, rounded to two decimals.
    pub total_issues_change_pct: f64,
    pub ml_score_change: i32,
    /// Whole days from session1 to session2 (negative if session2 is older).
    pub time_difference_days: i64,
    pub trend: Trend,
}

/// A session compared against the mean of its recent predecessors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendResult {
    pub session: SessionId,
    pub source: String,
    pub period_days: u32,
    pub previous_sessions_count: usize,
    pub average_issues: f64,
    pub current_issues: usize,
    pub difference_from_average: f64,
    pub difference_pct: f64,
    pub trend: Trend,
}

/// Compares recorded sessions.
#[derive(Debug, Clone, Default)]
pub struct SessionComparator {
    config: TrendConfig,
}

impl SessionComparator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: TrendConfig) -> Self {
        Self { config }
    }

    /// Compare a baseline session with a current one.
    pub fn compare<H>(&self, history: &H, id1: SessionId, id2: SessionId) -> Result<ComparisonResult>
    where
        H: SessionHistory + ?Sized,
    {
        let s1 = lookup(history, id1)?;
        let s2 = lookup(history, id2)?;

        let before = &s1.issues_by_severity;
        let after = &s2.issues_by_severity;
        let change_pct = percent_change(s1.total_issues as f64, s2.total_issues as f64);
        let trend = Trend::classify(change_pct, self.config.threshold_pct);

        debug!(session1 = id1, session2 = id2, change_pct, %trend, "compared sessions");

        Ok(ComparisonResult {
            session1: id1,
            session2: id2,
            issues_by_severity_change: SeverityDelta {
                high: delta(before.high, after.high),
                medium: delta(before.medium, after.medium),
                low: delta(before.low, after.low),
            },
            total_issues_change: delta(s1.total_issues, s2.total_issues),
            total_issues_change_pct: change_pct,
            ml_score_change: i32::from(s2.ml_score) - i32::from(s1.ml_score),
            time_difference_days: (s2.created_at - s1.created_at).num_days(),
            trend,
        })
    }

    /// Compare a session with the mean issue count of earlier sessions of the
    /// same source created within `days` before it.
    pub fn trend<H>(&self, history: &H, id: SessionId, days: u32) -> Result<TrendResult>
    where
        H: SessionHistory + ?Sized,
    {
        let current = lookup(history, id)?;
        // A window reaching past the representable range has no lower bound.
        let cutoff = Duration::try_days(i64::from(days))
            .and_then(|window| current.created_at.checked_sub_signed(window));

        let previous: Vec<&SessionSummary> = history
            .sessions()
            .iter()
            .filter(|s| s.id != current.id && s.source == current.source)
            .filter(|s| cutoff.is_none_or(|cutoff| s.created_at >= cutoff))
            .filter(|s| (s.created_at, s.id) < (current.created_at, current.id))
            .collect();

        if previous.is_empty() {
            return Err(SieveError::InsufficientHistory { session: id, days });
        }

        let average =
            previous.iter().map(|s| s.total_issues as f64).sum::<f64>() / previous.len() as f64;
        let current_issues = current.total_issues as f64;
        let difference_pct = percent_change(average, current_issues);
        let trend = Trend::classify(difference_pct, self.config.threshold_pct);

        debug!(session = id, previous = previous.len(), average, difference_pct, %trend, "computed trend");

        Ok(TrendResult {
            session: id,
            source: current.source.clone(),
            period_days: days,
            previous_sessions_count: previous.len(),
            average_issues: round2(average),
            current_issues: current.total_issues,
            difference_from_average: round2(current_issues - average),
            difference_pct,
            trend,
        })
    }
}

fn lookup<H>(history: &H, id: SessionId) -> Result<&SessionSummary>
where
    H: SessionHistory + ?Sized,
{
    history.session(id).ok_or(SieveError::SessionNotFound(id))
}

fn delta(before: usize, after: usize) -> i64 {
    after as i64 - before as i64
}

/// Percentage change from `baseline`, with the baseline floored at 1.
fn percent_change(baseline: f64, current: f64) -> f64 {
    round2((current - baseline) / baseline.max(1.0) * 100.0)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::HistoryStore;
    use crate::scoring::ReadinessLevel;
    use crate::sieve::SeverityCounts;
    use chrono::{TimeZone, Utc};

    fn summary(source: &str, day: u32, high: usize, low: usize) -> SessionSummary {
        SessionSummary {
            id: 0,
            source: source.to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap(),
            rows: 10,
            columns: 3,
            total_issues: high + low,
            issues_by_severity: SeverityCounts { high, medium: 0, low },
            ml_score: 80,
            ml_level: ReadinessLevel::Good,
        }
    }

    #[test]
    fn test_compare_improving() {
        let mut store = HistoryStore::new();
        let a = store.insert(summary("data.csv", 1, 10, 10));
        let b = store.insert(summary("data.csv", 8, 5, 10));

        let result = SessionComparator::new().compare(&store, a, b).unwrap();
        assert_eq!(result.total_issues_change, -5);
        assert_eq!(result.total_issues_change_pct, -25.0);
        assert_eq!(result.trend, Trend::Improving);
        assert_eq!(result.issues_by_severity_change.high, -5);
        assert_eq!(result.issues_by_severity_change.low, 0);
        assert_eq!(result.time_difference_days, 7);
    }

    #[test]
    fn test_compare_from_zero_issues() {
        let mut store = HistoryStore::new();
        let a = store.insert(summary("d", 1, 0, 0));
        let b = store.insert(summary("d", 2, 3, 0));
        let result = SessionComparator::new().compare(&store, a, b).unwrap();
        assert_eq!(result.total_issues_change_pct, 300.0);
        assert_eq!(result.trend, Trend::Degrading);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        assert_eq!(Trend::classify(-5.0, 5.0), Trend::Improving);
        assert_eq!(Trend::classify(5.0, 5.0), Trend::Degrading);
        assert_eq!(Trend::classify(4.99, 5.0), Trend::Stable);
        assert_eq!(Trend::classify(0.0, 5.0), Trend::Stable);
    }

    #[test]
    fn test_compare_missing_session() {
        let mut store = HistoryStore::new();
        let a = store.insert(summary("d", 1, 1, 0));
        let err = SessionComparator::new().compare(&store, a, 42).unwrap_err();
        assert!(matches!(err, SieveError::SessionNotFound(42)));
    }

    #[test]
    fn test_trend_uses_same_source_within_window() {
        let mut store = HistoryStore::new();
        store.insert(summary("data.csv", 1, 100, 0)); // outside 7-day window
        store.insert(summary("data.csv", 10, 10, 0));
        store.insert(summary("other.csv", 11, 50, 0)); // other source
        store.insert(summary("data.csv", 12, 20, 0));
        let current = store.insert(summary("data.csv", 15, 12, 0));
        store.insert(summary("data.csv", 20, 0, 0)); // after current

        let result = SessionComparator::new().trend(&store, current, 7).unwrap();
        assert_eq!(result.previous_sessions_count, 2);
        assert_eq!(result.average_issues, 15.0);
        assert_eq!(result.difference_from_average, -3.0);
        assert_eq!(result.difference_pct, -20.0);
        assert_eq!(result.trend, Trend::Improving);
    }

    #[test]
    fn test_trend_with_unbounded_window() {
        let mut store = HistoryStore::new();
        store.insert(summary("data.csv", 1, 10, 0));
        store.insert(summary("data.csv", 5, 30, 0));
        let current = store.insert(summary("data.csv", 9, 20, 0));

        let result = SessionComparator::new()
            .trend(&store, current, u32::MAX)
            .unwrap();
        assert_eq!(result.period_days, u32::MAX);
        assert_eq!(result.previous_sessions_count, 2);
        assert_eq!(result.average_issues, 20.0);
        assert_eq!(result.trend, Trend::Stable);
    }

    #[test]
    fn test_trend_without_history() {
        let mut store = HistoryStore::new();
        store.insert(summary("other.csv", 1, 5, 0));
        let current = store.insert(summary("data.csv", 2, 5, 0));

        let err = SessionComparator::new().trend(&store, current, 30).unwrap_err();
        assert!(matches!(
            err,
            SieveError::InsufficientHistory { session, days: 30 } if session == current
        ));
    }

    #[test]
    fn test_works_over_plain_slices() {
        let mut a = summary("d", 1, 4, 0);
        a.id = 7;
        let mut b = summary("d", 2, 4, 0);
        b.id = 9;
        let sessions = vec![a, b];
        let result = SessionComparator::new().compare(sessions.as_slice(), 7, 9).unwrap();
        assert_eq!(result.trend, Trend::Stable);
    }
}
