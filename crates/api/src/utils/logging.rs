//! Tracing initialisation

use tracing_subscriber::EnvFilter;

/// Initialise the global tracing subscriber.
///
/// Respects `RUST_LOG`, defaulting to `info` for the workspace crates.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(true).init();
}
