//! Diagnostic logging setup.
//!
//! `INSIGHT_LOG` (EnvFilter syntax) wins over the `[log] level` config value.
//! Everything goes to stderr so answers on stdout stay clean.

use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "INSIGHT_LOG";

/// Filter from the environment, else from `level`, else `warn`
pub fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Install the global subscriber. A second call is a no-op.
pub fn init(level: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(build_filter(level))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
