//! History command - list recorded sessions.

use std::path::PathBuf;

use colored::Colorize;
use sieve::{HistoryStore, SessionSummary};

use super::colored_level;

pub fn run(history: PathBuf, limit: usize, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let store = HistoryStore::load(&history)?;
    let sessions = store.recent(limit);

    if json {
        println!("{}", serde_json::to_string_pretty(&sessions)?);
        return Ok(());
    }

    if sessions.is_empty() {
        println!("{}", "No sessions recorded".yellow());
        return Ok(());
    }

    println!(
        "{} {} of {} session(s)",
        "History".cyan().bold(),
        sessions.len().to_string().white().bold(),
        store.len()
    );
    println!();
    for session in sessions {
        print_session(session);
    }

    Ok(())
}

fn print_session(session: &SessionSummary) {
    let counts = &session.issues_by_severity;
    println!(
        "  {:>5}  {}  {:<24} {:>6} issues ({} high, {} medium, {} low)  {:>3}/100 {}",
        session.id.to_string().white().bold(),
        session.created_at.format("%Y-%m-%d %H:%M"),
        session.source,
        session.total_issues,
        counts.high,
        counts.medium,
        counts.low,
        session.ml_score,
        colored_level(session.ml_level)
    );
}
