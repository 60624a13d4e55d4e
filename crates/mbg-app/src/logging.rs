//! Logging setup
//!
//! Diagnostics go to stderr through `tracing`; stdout stays reserved for
//! command output so JSON can be piped.

use tracing_subscriber::EnvFilter;

/// Pick the filter directive: RUST_LOG, then `--verbose`, then the config value
pub fn filter_directive(env: Option<&str>, verbose: bool, configured: &str) -> String {
    match env {
        Some(directive) if !directive.trim().is_empty() => directive.to_string(),
        _ if verbose => "debug".to_string(),
        _ => configured.to_string(),
    }
}

/// Whether `directive` parses as an `EnvFilter`
pub fn is_valid_directive(directive: &str) -> bool {
    EnvFilter::try_new(directive).is_ok()
}

/// Install the global subscriber. Safe to call more than once.
pub fn init(verbose: bool, configured: &str) {
    let env = std::env::var("RUST_LOG").ok();
    let directive = filter_directive(env.as_deref(), verbose, configured);
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
