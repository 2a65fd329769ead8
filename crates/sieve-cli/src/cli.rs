//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Sieve: data quality validation and ML-readiness scoring
#[derive(Parser)]
#[command(name = "sieve")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate a data file and report issues and ML readiness
    Check {
        /// Path to the data file (CSV/TSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Rule configuration (JSON array); built-in rules when omitted
        #[arg(short, long)]
        rules: Option<PathBuf>,

        /// Engine configuration (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Write the full validation result as JSON to this path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Record the run as a session in this history file
        #[arg(long)]
        history: Option<PathBuf>,

        /// Logical source name for the session (default: file name)
        #[arg(long, requires = "history")]
        source: Option<String>,

        /// Print the validation result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compare two recorded sessions
    Compare {
        /// Session history file
        #[arg(long)]
        history: PathBuf,

        /// Baseline session id
        #[arg(value_name = "SESSION1")]
        session1: u64,

        /// Current session id
        #[arg(value_name = "SESSION2")]
        session2: u64,

        /// Engine configuration (JSON), for the trend threshold
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compare a session with the average of earlier sessions of its source
    Trend {
        /// Session history file
        #[arg(long)]
        history: PathBuf,

        /// Session id
        #[arg(value_name = "SESSION")]
        session: u64,

        /// Number of days to look back
        #[arg(short, long, default_value = "30")]
        days: u32,

        /// Engine configuration (JSON), for the trend threshold
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List recorded sessions, newest first
    History {
        /// Session history file
        #[arg(long)]
        history: PathBuf,

        /// Maximum number of sessions to list
        #[arg(short, long, default_value = "10")]
        limit: usize,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate several files concurrently
    Batch {
        /// Data files to validate
        #[arg(value_name = "FILES", required = true)]
        files: Vec<PathBuf>,

        /// Rule configuration (JSON array); built-in rules when omitted
        #[arg(short, long)]
        rules: Option<PathBuf>,

        /// Engine configuration (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Maximum number of files validated at once
        #[arg(short, long, default_value = "4")]
        workers: usize,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
