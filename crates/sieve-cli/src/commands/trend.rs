//! Trend command - compare a session with its recent history.

use std::path::PathBuf;

use colored::Colorize;
use sieve::{HistoryStore, SessionComparator, SessionId};

use super::{colored_trend, load_config};

pub fn run(
    history: PathBuf,
    session: SessionId,
    days: u32,
    config: Option<PathBuf>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config.as_deref())?;
    let store = HistoryStore::load(&history)?;
    let trend = SessionComparator::with_config(config.trend).trend(&store, session, days)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&trend)?);
        return Ok(());
    }

    println!(
        "{} session {} of {} over the last {} day(s)",
        "Trend".cyan().bold(),
        session.to_string().white().bold(),
        trend.source.white().bold(),
        trend.period_days
    );
    println!();
    println!("  Previous sessions: {}", trend.previous_sessions_count);
    println!("  Average issues:    {:.2}", trend.average_issues);
    println!("  Current issues:    {}", trend.current_issues);
    println!(
        "  Difference:        {:+.2} ({:+.2}%)",
        trend.difference_from_average, trend.difference_pct
    );
    println!();
    println!("{} {}", "Trend".white().bold(), colored_trend(trend.trend));

    Ok(())
}
