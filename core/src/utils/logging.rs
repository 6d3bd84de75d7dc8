use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize logging with tracing
///
/// Reads the filter from the RUST_LOG environment variable if available and
/// falls back to "liveflow=debug,warn" otherwise.
///
/// # Example
///
/// ```no_run
/// use liveflow::utils::logging::init_logging;
///
/// init_logging();
/// ```
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("liveflow=debug,warn"));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    tracing::info!("LiveFlow logging initialized");
}
