//! Unified error type for bedrockvoid.

use bedrockvoid_protocol::ProtocolError;

/// Top-level error for the codec facade.
///
/// Protocol errors convert through `#[from]`, so `?` lifts them out of
/// registry calls without a `map_err`.
#[derive(Debug, thiserror::Error)]
pub enum BedrockVoidError {
    /// An encode or decode failure from the protocol layer.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The configuration could not be loaded or failed validation.
    #[error("configuration error: {0}")]
    Config(String),

    /// The tracing subscriber could not be installed.
    #[error("logging setup failed: {0}")]
    Logging(String),
}

#[cfg(test)]
mod tests {
    use bedrockvoid_protocol::Direction;

    use super::*;

    #[test]
    fn test_from_protocol_error() {
        let err = ProtocolError::InvalidMessage("bad".into());
        let top: BedrockVoidError = err.into();
        assert!(matches!(top, BedrockVoidError::Protocol(_)));
        assert!(top.to_string().contains("bad"));
    }

    #[test]
    fn test_protocol_error_is_transparent() {
        let err = ProtocolError::UnknownOpcode {
            opcode: 0x99,
            direction: Direction::Inbound,
        };
        let expected = err.to_string();
        let top: BedrockVoidError = err.into();
        assert_eq!(top.to_string(), expected);
    }

    #[test]
    fn test_config_error_display() {
        let err = BedrockVoidError::Config("filter is bogus".into());
        assert_eq!(err.to_string(), "configuration error: filter is bogus");
    }

    #[test]
    fn test_logging_error_display() {
        let err = BedrockVoidError::Logging("already set".into());
        assert!(err.to_string().starts_with("logging setup failed"));
    }
}
