use tracing_subscriber::{
    filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, Layer,
};

/// Initialize console logging.
///
/// `RUST_LOG` takes precedence over the level passed on the command line.
pub fn init(level: &str) {
    let filter = EnvFilter::builder()
        .with_default_directive(level.parse().unwrap_or_else(|_| {
            eprintln!("Invalid log level {level:?}, falling back to info");
            tracing::Level::INFO.into()
        }))
        .from_env_lossy();

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr) // stderr for logs, stdout for meters
        .with_target(false);

    tracing_subscriber::registry()
        .with(console_layer.with_filter(filter))
        .init();

    tracing::info!("Logging initialized at level: {}", level);
}
