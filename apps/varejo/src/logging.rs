//! Tracing subscriber setup.

use tracing_subscriber::{EnvFilter, fmt};

/// Initialize the global subscriber.
///
/// Reads `RUST_LOG`, then `LOG_LEVEL`, falling back to `default_level`.
/// Output goes to stderr so command output on stdout stays clean.
pub fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_env("RUST_LOG")
        .or_else(|_| EnvFilter::try_from_env("LOG_LEVEL"))
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    // A second init (e.g. from tests) is not an error worth surfacing.
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
}
