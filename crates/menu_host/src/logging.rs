//! Logging system setup.
//!
//! `RUST_LOG` overrides the configured level when set. Logs go to stderr so dump
//! output on stdout stays machine-readable.

use crate::config::LoggingSettings;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Installs the global tracing subscriber.
pub fn setup_logging(config: &LoggingSettings) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let registry = tracing_subscriber::registry().with(filter);

    if config.json_format {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_file(false)
                    .with_line_number(false)
                    .with_thread_names(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()?;
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_names(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()?;
    }

    info!("Logging initialized with level: {}", config.level);
    Ok(())
}
