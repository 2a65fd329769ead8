//! Compare command - diff two recorded sessions.

use std::path::PathBuf;

use colored::Colorize;
use sieve::{HistoryStore, SessionComparator, SessionId};

use super::{colored_trend, load_config};

pub fn run(
    history: PathBuf,
    session1: SessionId,
    session2: SessionId,
    config: Option<PathBuf>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config.as_deref())?;
    let store = HistoryStore::load(&history)?;
    let comparison = SessionComparator::with_config(config.trend).compare(&store, session1, session2)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&comparison)?);
        return Ok(());
    }

    println!(
        "{} session {} -> session {}",
        "Comparing".cyan().bold(),
        session1.to_string().white().bold(),
        session2.to_string().white().bold()
    );
    println!();

    let delta = comparison.issues_by_severity_change;
    println!(
        "  Issues:      {:+} ({:+.2}%)",
        comparison.total_issues_change, comparison.total_issues_change_pct
    );
    println!(
        "  By severity: {:+} high, {:+} medium, {:+} low",
        delta.high, delta.medium, delta.low
    );
    println!("  ML score:    {:+}", comparison.ml_score_change);
    println!("  Elapsed:     {} day(s)", comparison.time_difference_days);
    println!();
    println!("{} {}", "Trend".white().bold(), colored_trend(comparison.trend));

    Ok(())
}
