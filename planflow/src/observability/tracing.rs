//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

/// Installs a global tracing subscriber with env-filter support.
///
/// Filter defaults to `info` and honors `RUST_LOG`. Safe to call more
/// than once; later calls are no-ops.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init();
}
