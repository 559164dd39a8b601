//! Logging bootstrap.

use tracing_subscriber::EnvFilter;

/// Default log filter directive.
pub const DEFAULT_LOG_FILTER: &str = "condor=info,condor_cli=info,probe=info";

/// Install the global fmt subscriber.
///
/// `directives` overrides the default filter; an explicit `RUST_LOG`
/// environment variable wins over both. Calling this twice is a no-op, not
/// an error, so tests and embedders can both use it freely.
pub fn init(directives: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(directives.unwrap_or(DEFAULT_LOG_FILTER)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
