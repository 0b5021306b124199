//! Subscriber setup.

use tracing_subscriber::EnvFilter;

use crate::{BedrockVoidError, LoggingConfig};

/// Installs a global `fmt` subscriber built from `config`.
///
/// An empty `config.filter` defers to `RUST_LOG`, and to `info` when that
/// is unset too.
///
/// # Errors
/// [`BedrockVoidError::Config`] for a bad filter directive,
/// [`BedrockVoidError::Logging`] when a global subscriber is already set.
pub fn init(config: &LoggingConfig) -> Result<(), BedrockVoidError> {
    let filter = if config.filter.is_empty() {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    } else {
        EnvFilter::try_new(&config.filter).map_err(|e| {
            BedrockVoidError::Config(format!("invalid log filter '{}': {e}", config.filter))
        })?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(config.ansi)
        .with_target(config.with_target)
        .try_init()
        .map_err(|e| BedrockVoidError::Logging(e.to_string()))?;

    tracing::debug!(filter = %config.filter, "logging initialised");
    Ok(())
}
