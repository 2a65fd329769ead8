//! Sieve CLI - data quality validation and ML-readiness scoring.

mod cli;
mod commands;
mod logging;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result = match cli.command {
        Commands::Check {
            file,
            rules,
            config,
            output,
            history,
            source,
            json,
        } => commands::check::run(commands::check::CheckArgs {
            file,
            rules,
            config,
            output,
            history,
            source,
            json,
            verbose: cli.verbose,
        }),

        Commands::Compare {
            history,
            session1,
            session2,
            config,
            json,
        } => commands::compare::run(history, session1, session2, config, json),

        Commands::Trend {
            history,
            session,
            days,
            config,
            json,
        } => commands::trend::run(history, session, days, config, json),

        Commands::History {
            history,
            limit,
            json,
        } => commands::history::run(history, limit, json),

        Commands::Batch {
            files,
            rules,
            config,
            workers,
            json,
        } => commands::batch::run(files, rules, config, workers, json),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
