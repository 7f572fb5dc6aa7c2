pub mod app;
pub mod domain;
pub mod infra;

use tracing_subscriber::EnvFilter;

/// Install the diagnostics subscriber. Logs go to stderr, filtered by `RUST_LOG`.
pub fn init() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
}
