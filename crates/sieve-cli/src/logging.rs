//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

/// Install the global subscriber, logging to stderr.
///
/// `RUST_LOG` takes precedence; otherwise warnings are shown, or everything
/// down to debug with `--verbose`.
pub fn init(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
