/// Structured logging for the scene selection service.
///
/// Thin wrapper over `tracing_subscriber`: honors `RUST_LOG` when set,
/// otherwise defaults to `info` (or `debug` with `--verbose`). Initialized
/// once by the binary; library code only emits `tracing` events and never
/// configures output itself.

use tracing_subscriber::EnvFilter;

/// Initializes the global subscriber. Safe to call more than once — later
/// calls are no-ops, which keeps tests that exercise the binary paths quiet.
pub fn init(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
