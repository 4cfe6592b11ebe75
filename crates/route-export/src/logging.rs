use tracing_subscriber::prelude::*;

/// Initialize logging with sensible defaults
///
/// Honours `RUST_LOG` when set; otherwise debug builds log at DEBUG and
/// release builds at INFO.
pub fn setup_logging() {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::fmt;

    let default_level = if cfg!(debug_assertions) { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let fmt_layer = fmt::layer().with_writer(std::io::stderr).with_filter(filter);
    tracing_subscriber::registry().with(fmt_layer).init();

    tracing::debug!(
        "{} {} logging initialized",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );
}
