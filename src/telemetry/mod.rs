//! Tracing setup.

use anyhow::Result;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

use crate::config::TelemetryConfig;

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level when set.
pub fn init_tracing(config: &TelemetryConfig) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if config.json_logs {
        subscriber
            .with(fmt::layer().json().with_target(true))
            .init();
    } else {
        subscriber.with(fmt::layer().with_target(true)).init();
    }

    Ok(())
}
