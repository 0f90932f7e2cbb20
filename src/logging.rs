//! tracing subscriber setup for the binary.

use tracing_subscriber::EnvFilter;

/// Environment variable holding a tracing filter directive.
pub const LOG_ENV: &str = "CHATBLOCK_LOG";

const DEFAULT_LEVEL: &str = "warn";

/// Pick the filter directive: env var, then `-v`, then config, then `warn`.
pub fn filter_directive(env: Option<&str>, verbose: bool, config_level: Option<&str>) -> String {
    if let Some(env) = env.map(str::trim).filter(|s| !s.is_empty()) {
        return env.to_string();
    }
    if verbose {
        return "debug".to_string();
    }
    config_level
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_LEVEL)
        .to_string()
}

/// Install the global subscriber. Logs go to stderr so stdout stays parseable.
///
/// Calling this twice is harmless; the second install is ignored.
pub fn init(verbose: bool, config_level: Option<&str>) {
    let env = std::env::var(LOG_ENV).ok();
    let directive = filter_directive(env.as_deref(), verbose, config_level);
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
