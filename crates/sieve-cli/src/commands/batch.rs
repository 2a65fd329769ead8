//! Batch command - validate several files on a bounded worker pool.

use std::path::PathBuf;
use std::sync::Arc;

use colored::Colorize;
use serde::Serialize;
use sieve::{ReadinessLevel, RuleSet, Sieve};
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use super::{colored_level, load_config, load_rules};

/// Outcome of validating one file in a batch.
#[derive(Debug, Serialize)]
pub struct FileOutcome {
    pub file: PathBuf,
    #[serde(flatten)]
    pub status: FileStatus,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum FileStatus {
    Ok {
        rows: usize,
        columns: usize,
        issues: usize,
        ml_score: u8,
        ml_level: ReadinessLevel,
    },
    Failed {
        error: String,
    },
}

impl FileOutcome {
    fn failed(file: PathBuf, error: impl ToString) -> Self {
        Self {
            file,
            status: FileStatus::Failed {
                error: error.to_string(),
            },
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self.status, FileStatus::Ok { .. })
    }
}

pub fn run(
    files: Vec<PathBuf>,
    rules: Option<PathBuf>,
    config: Option<PathBuf>,
    workers: usize,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let rules = load_rules(rules.as_deref())?;
    let sieve = Sieve::with_config(load_config(config.as_deref())?);

    if !json {
        println!(
            "{} {} file(s) with {} worker(s)",
            "Validating".cyan().bold(),
            files.len().to_string().white().bold(),
            workers.max(1)
        );
        println!();
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let outcomes = runtime.block_on(validate_all(files, Arc::new(sieve), Arc::new(rules), workers));

    if json {
        println!("{}", serde_json::to_string_pretty(&outcomes)?);
    } else {
        print_outcomes(&outcomes);
    }

    let failed = outcomes.iter().filter(|o| !o.is_ok()).count();
    if failed > 0 {
        return Err(format!("{} of {} file(s) failed", failed, outcomes.len()).into());
    }
    Ok(())
}

/// Validate every file, at most `workers` at a time.
///
/// A failing file is reported in its own outcome and does not stop the
/// others. Outcomes are returned in input order.
pub async fn validate_all(
    files: Vec<PathBuf>,
    sieve: Arc<Sieve>,
    rules: Arc<RuleSet>,
    workers: usize,
) -> Vec<FileOutcome> {
    let semaphore = Arc::new(Semaphore::new(workers.max(1)));
    let mut handles = Vec::with_capacity(files.len());

    for file in files {
        let sem = semaphore.clone();
        let sieve = sieve.clone();
        let rules = rules.clone();
        let path = file.clone();

        let handle = tokio::spawn(async move {
            let Ok(_permit) = sem.acquire().await else {
                return FileOutcome::failed(path, "worker pool closed");
            };
            debug!(file = %path.display(), "validating");

            let task_path = path.clone();
            let joined =
                tokio::task::spawn_blocking(move || sieve.validate_file(&task_path, &rules)).await;

            match joined {
                Ok(Ok((result, _))) => FileOutcome {
                    file: path,
                    status: FileStatus::Ok {
                        rows: result.rows,
                        columns: result.columns,
                        issues: result.summary.total,
                        ml_score: result.ml_score,
                        ml_level: result.ml_level,
                    },
                },
                Ok(Err(e)) => {
                    warn!(file = %path.display(), error = %e, "validation failed");
                    FileOutcome::failed(path, e)
                }
                Err(e) => FileOutcome::failed(path, format!("worker panicked: {}", e)),
            }
        });
        handles.push((file, handle));
    }

    let mut outcomes = Vec::with_capacity(handles.len());
    for (file, handle) in handles {
        let outcome = match handle.await {
            Ok(outcome) => outcome,
            Err(e) => FileOutcome::failed(file, format!("task failed: {}", e)),
        };
        outcomes.push(outcome);
    }
    outcomes
}

fn print_outcomes(outcomes: &[FileOutcome]) {
    for outcome in outcomes {
        let name = outcome.file.display().to_string();
        match &outcome.status {
            FileStatus::Ok {
                rows,
                columns,
                issues,
                ml_score,
                ml_level,
            } => println!(
                "  {} {:<32} {:>7} rows {:>4} cols {:>6} issues  {:>3}/100 {}",
                "✓".green(),
                name,
                rows,
                columns,
                issues,
                ml_score,
                colored_level(*ml_level)
            ),
            FileStatus::Failed { error } => {
                println!("  {} {:<32} {}", "✗".red(), name, error.red())
            }
        }
    }

    let ok = outcomes.iter().filter(|o| o.is_ok()).count();
    println!();
    println!(
        "{} {} succeeded, {} failed",
        "Done".green().bold(),
        ok,
        outcomes.len() - ok
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[tokio::test]
    async fn test_failures_are_isolated_and_order_kept() {
        let dir = TempDir::new().unwrap();
        let clean = write(&dir, "clean.csv", "id,age\n1,30\n2,40\n");
        let ragged = write(&dir, "ragged.csv", "id,age\n1,30\n2\n");
        let missing = dir.path().join("missing.csv");
        let gappy = write(&dir, "gappy.csv", "id,age\n1,30\n2,\n");

        let outcomes = validate_all(
            vec![clean.clone(), ragged.clone(), missing.clone(), gappy.clone()],
            Arc::new(Sieve::new()),
            Arc::new(RuleSet::default_rules()),
            2,
        )
        .await;

        let files: Vec<_> = outcomes.iter().map(|o| o.file.clone()).collect();
        assert_eq!(files, vec![clean, ragged, missing, gappy]);

        assert!(matches!(
            outcomes[0].status,
            FileStatus::Ok { issues: 0, ml_score: 100, .. }
        ));
        assert!(!outcomes[1].is_ok());
        assert!(!outcomes[2].is_ok());
        assert!(matches!(outcomes[3].status, FileStatus::Ok { issues: 1, .. }));
    }

    #[tokio::test]
    async fn test_zero_workers_still_runs() {
        let dir = TempDir::new().unwrap();
        let file = write(&dir, "a.csv", "x\n1\n");

        let outcomes = validate_all(
            vec![file],
            Arc::new(Sieve::new()),
            Arc::new(RuleSet::default_rules()),
            0,
        )
        .await;

        assert_eq!(outcomes.len(), 1);
        assert!(outcomes[0].is_ok());
    }
}
