//! Codec configuration.
//!
//! ## Sources
//! - [`CodecConfig::default()`]
//! - JSON via [`CodecConfig::from_json()`]; missing fields take defaults
//! - Environment via [`CodecConfig::from_env()`]:
//!   `BEDROCKVOID_LOG` (filter directive) and
//!   `BEDROCKVOID_TRACE_PAYLOADS` (`true`/`false`/`1`/`0`)

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use crate::BedrockVoidError;

/// Environment variable holding the log filter directive.
pub const LOG_ENV: &str = "BEDROCKVOID_LOG";

/// Environment variable toggling payload tracing.
pub const TRACE_PAYLOADS_ENV: &str = "BEDROCKVOID_TRACE_PAYLOADS";

/// Top-level configuration for a [`PacketCodec`](crate::PacketCodec).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Subscriber settings used by [`logging::init`](crate::logging::init).
    pub logging: LoggingConfig,

    /// Log the raw bytes of every packet at trace level.
    pub trace_payloads: bool,
}

impl CodecConfig {
    /// Parses a JSON document.
    pub fn from_json(content: &str) -> Result<Self, BedrockVoidError> {
        serde_json::from_str(content)
            .map_err(|e| BedrockVoidError::Config(format!("failed to parse JSON: {e}")))
    }

    /// Starts from defaults and applies the environment overrides.
    ///
    /// # Errors
    /// Returns [`BedrockVoidError::Config`] when `BEDROCKVOID_TRACE_PAYLOADS`
    /// is set to something other than a boolean.
    pub fn from_env() -> Result<Self, BedrockVoidError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, BedrockVoidError> {
        let mut config = Self::default();

        if let Some(filter) = lookup(LOG_ENV) {
            config.logging.filter = filter;
        }

        if let Some(flag) = lookup(TRACE_PAYLOADS_ENV) {
            config.trace_payloads = parse_flag(&flag).ok_or_else(|| {
                BedrockVoidError::Config(format!(
                    "{TRACE_PAYLOADS_ENV} must be a boolean, got '{flag}'"
                ))
            })?;
        }

        Ok(config)
    }

    /// Lists every problem with this configuration. Empty means valid.
    pub fn validate(&self) -> Vec<String> {
        self.logging.validate()
    }

    /// Like [`validate()`](Self::validate) but folds the problems into one
    /// error.
    pub fn validate_strict(&self) -> Result<(), BedrockVoidError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(BedrockVoidError::Config(format!(
                "validation failed:\n  - {}",
                errors.join("\n  - ")
            )))
        }
    }
}

/// Settings for the `tracing` subscriber.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `"info,bedrockvoid_protocol=trace"`.
    /// Empty falls back to `RUST_LOG`.
    pub filter: String,

    /// Colourise output.
    pub ansi: bool,

    /// Include the event target (module path) in each line.
    pub with_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            ansi: true,
            with_target: false,
        }
    }
}

impl LoggingConfig {
    /// Lists problems with the filter directive. Empty means valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if !self.filter.is_empty() {
            if let Err(e) = EnvFilter::try_new(&self.filter) {
                errors.push(format!("invalid log filter '{}': {e}", self.filter));
            }
        }

        errors
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
