use tracing_subscriber::EnvFilter;

/// Initialize structured logging for the process.
///
/// `RUST_LOG` controls the filter; the default keeps the engine at `info`.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
