//! Check command - validate one file and report.

use std::path::PathBuf;

use colored::Colorize;
use sieve::{HistoryStore, Severity, Sieve, ValidationResult};

use super::{colored_level, load_config, load_rules, write_json};

/// Maximum issues listed in the human-readable report.
const MAX_LISTED_ISSUES: usize = 20;

pub struct CheckArgs {
    pub file: PathBuf,
    pub rules: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub history: Option<PathBuf>,
    pub source: Option<String>,
    pub json: bool,
    pub verbose: bool,
}

pub fn run(args: CheckArgs) -> Result<(), Box<dyn std::error::Error>> {
    if !args.file.exists() {
        return Err(format!("File not found: {}", args.file.display()).into());
    }

    let rules = load_rules(args.rules.as_deref())?;
    let config = load_config(args.config.as_deref())?;
    let sieve = Sieve::with_config(config);

    if !args.json {
        println!(
            "{} {}",
            "Checking".cyan().bold(),
            args.file.display().to_string().white().bold()
        );
    }

    let (result, metadata) = sieve.validate_file(&args.file, &rules)?;

    if let Some(output) = &args.output {
        write_json(output, &result)?;
    }

    let session = match &args.history {
        Some(history) => {
            let mut store = HistoryStore::load_or_default(history)?;
            let source = args.source.clone().unwrap_or_else(|| metadata.file.clone());
            let id = store.record(source, &result);
            store.save(history)?;
            Some(id)
        }
        None => None,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    print_report(&result, args.verbose);

    if let Some(output) = &args.output {
        println!(
            "{} {}",
            "Saved to".green().bold(),
            output.display().to_string().white()
        );
    }
    if let Some(id) = session {
        println!("{} session {}", "Recorded".green().bold(), id.to_string().white().bold());
    }

    Ok(())
}

fn print_report(result: &ValidationResult, verbose: bool) {
    println!();
    println!(
        "  {} rows, {} columns",
        result.rows.to_string().white().bold(),
        result.columns.to_string().white().bold()
    );

    if verbose {
        println!();
        println!("{}", "Columns".white().bold());
        for profile in &result.profiles {
            println!(
                "  {:<24} {:<8} {:>6.1}% missing  {} distinct",
                profile.name,
                profile.effective_type().as_str(),
                profile.null_percentage(),
                profile.distinct_count
            );
        }
    }

    println!();
    let summary = &result.summary;
    if summary.total == 0 {
        println!("  {}", "No issues found".green());
    } else {
        println!(
            "{} {} ({} high, {} medium, {} low)",
            "Issues".white().bold(),
            summary.total.to_string().white().bold(),
            summary.by_severity.high.to_string().red(),
            summary.by_severity.medium.to_string().yellow(),
            summary.by_severity.low.to_string().blue()
        );
        for (category, count) in summary.by_category.iter().filter(|(_, n)| **n > 0) {
            println!("  {:<18} {}", category.label(), count);
        }

        println!();
        for issue in result
            .issues
            .iter()
            .filter(|i| i.category.is_scored())
            .take(MAX_LISTED_ISSUES)
        {
            let tag = match issue.severity {
                Severity::High => "HIGH".red().bold(),
                Severity::Medium => " MED".yellow(),
                Severity::Low => " LOW".blue(),
            };
            println!("  {} {}", tag, issue.message);
        }
        if summary.total > MAX_LISTED_ISSUES {
            println!(
                "  {}",
                format!("... and {} more", summary.total - MAX_LISTED_ISSUES).dimmed()
            );
        }
    }

    if summary.skipped_rules > 0 {
        println!();
        for issue in result.issues.iter().filter(|i| !i.category.is_scored()) {
            println!("  {} {}", "SKIP".dimmed(), issue.message.dimmed());
        }
    }

    println!();
    println!(
        "{} {}/100 ({})",
        "ML readiness".white().bold(),
        result.ml_score.to_string().white().bold(),
        colored_level(result.ml_level)
    );
    for recommendation in &result.recommendations {
        println!("  - {}", recommendation);
    }
}
