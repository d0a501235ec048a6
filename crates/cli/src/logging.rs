//! Diagnostic logging to stderr.
//!
//! Stdout carries the MCP protocol stream, so nothing else may write there.

use tracing_subscriber::EnvFilter;

/// Environment variable overriding the configured log level.
pub const LOG_LEVEL_ENV: &str = "MCP_LOG_LEVEL";

const FALLBACK_LEVEL: &str = "error";

/// Pick the active filter: command-line flag, then environment, then config.
pub fn resolve_level(flag: Option<&str>, configured: &str) -> String {
    pick_level(flag, std::env::var(LOG_LEVEL_ENV).ok().as_deref(), configured)
}

fn pick_level(flag: Option<&str>, env: Option<&str>, configured: &str) -> String {
    [flag, env, Some(configured)]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|level| !level.is_empty())
        .unwrap_or(FALLBACK_LEVEL)
        .to_ascii_lowercase()
}

/// Build the filter for `level`, keeping HTTP internals at `warn` or quieter.
fn filter_for(level: &str) -> EnvFilter {
    let directives = if is_verbose(level) {
        format!("{level},hyper=warn,reqwest=warn")
    } else {
        level.to_string()
    };
    EnvFilter::try_new(&directives).unwrap_or_else(|_| EnvFilter::new(FALLBACK_LEVEL))
}

fn is_verbose(level: &str) -> bool {
    matches!(level, "info" | "debug" | "trace")
        || level.split(',').any(|d| d.ends_with("=info") || d.ends_with("=debug") || d.ends_with("=trace"))
}

/// Install the global subscriber. A second call is a no-op.
pub fn init(level: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter_for(level))
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_ansi(false)
        .try_init();
}
