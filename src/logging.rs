//! Tracing initialisation for host applications that do not install their
//! own subscriber. The SDK itself only emits `tracing` events.

use crate::config::{LogFormat, LoggingConfig};
use tracing_subscriber::EnvFilter;

/// Installs a global subscriber honouring `RUST_LOG` and falling back to the
/// configured level. Safe to call when a subscriber is already installed;
/// the existing one wins.
pub fn init_tracing(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.to_lowercase()));

    let result = match config.format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .try_init(),
        LogFormat::Plain => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init(),
    };

    if result.is_err() {
        tracing::debug!("tracing subscriber already installed, keeping existing one");
    }
}
