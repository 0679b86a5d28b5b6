//! Logging configuration for Duckie.
//!
//! Logs go to stderr. `RUST_LOG` takes precedence over the level passed in.

use tracing_subscriber::EnvFilter;

/// Default filter when neither `RUST_LOG` nor a level flag is given.
pub const DEFAULT_LEVEL: &str = "info";

/// Initializes logging to stderr.
pub fn init_stderr_logging(level: Option<&str>) {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(level))
        .with_writer(std::io::stderr)
        .init();
}

/// Builds the filter from `RUST_LOG`, falling back to `level`, then [`DEFAULT_LEVEL`].
fn env_filter(level: Option<&str>) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::try_new(fallback_directive(level))
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL))
    })
}

fn fallback_directive(level: Option<&str>) -> &str {
    match level.map(str::trim) {
        Some(level) if !level.is_empty() => level,
        _ => DEFAULT_LEVEL,
    }
}
