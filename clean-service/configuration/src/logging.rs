use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{CleanConfig, LogFormat};

/// Installs the global subscriber. `RUST_LOG` wins over `logging.level`.
/// Does nothing if a subscriber is already installed.
pub fn setup_logging(config: &CleanConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    let registry = tracing_subscriber::registry().with(filter);

    let result = match config.logging.format {
        LogFormat::Pretty => registry.with(fmt::layer()).try_init(),
        LogFormat::Compact => registry.with(fmt::layer().compact()).try_init(),
        LogFormat::Json => registry.with(fmt::layer().json()).try_init(),
    };

    if result.is_ok() {
        tracing::info!(
            level = %config.logging.level,
            format = ?config.logging.format,
            "logging initialized"
        );
    }
}
