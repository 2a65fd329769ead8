//! Example: Validate a tabular data file with Sieve.
//!
//! Usage:
//!   cargo run --example validate -- <file_path> [rules.json]

use std::env;
use std::path::Path;

use sieve::{RuleSet, Severity, Sieve};

fn main() -> sieve::Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: cargo run --example validate -- <file_path> [rules.json]");
        std::process::exit(1);
    }

    let path = Path::new(&args[1]);
    if !path.exists() {
        eprintln!("Error: File not found: {}", path.display());
        std::process::exit(1);
    }

    let rules = match args.get(2) {
        Some(rules_path) => RuleSet::from_json_file(rules_path)?,
        None => RuleSet::default_rules(),
    };

    let (result, source) = Sieve::new().validate_file(path, &rules)?;

    let separator = "=".repeat(80);
    println!("{}", separator);
    println!("Sieve Validation: {}", source.file);
    println!("{}", separator);
    println!();

    println!("## Source");
    println!("  Format: {}", source.format);
    println!("  Rows: {}", source.row_count);
    println!("  Columns: {}", source.column_count);
    println!();

    println!("## Columns");
    for profile in &result.profiles {
        println!(
            "  {:20} {:10} nulls={:<5} distinct={}",
            profile.name,
            profile.effective_type().to_string(),
            profile.null_count,
            profile.distinct_count
        );
    }
    println!();

    println!("## Issues ({})", result.summary.total);
    for issue in &result.issues {
        let marker = match issue.severity {
            Severity::High => "[HIGH]",
            Severity::Medium => "[MED] ",
            Severity::Low => "[LOW] ",
        };
        println!("  {} {}", marker, issue.message);
    }
    println!();

    println!("## ML Readiness: {} ({})", result.ml_score, result.ml_level);
    for rec in &result.recommendations {
        println!("  - {}", rec);
    }

    Ok(())
}
