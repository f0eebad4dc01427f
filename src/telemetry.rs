//! Tracing setup for binaries and services embedding the engine.

use tracing_subscriber::EnvFilter;

/// Installs a global `fmt` subscriber filtered by `RUST_LOG`, defaulting to
/// `info`. Calling it twice is harmless; the second call is ignored.
pub fn init_tracing() {
    let initialized = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init()
        .is_ok();
    if initialized {
        tracing::info!("Tracing initialized");
    }
}
