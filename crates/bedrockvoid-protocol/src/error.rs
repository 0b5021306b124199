//! Error types for the protocol layer.
//!
//! Every failure the codec core can produce is a variant of
//! [`ProtocolError`]. None of them are recoverable for the packet being
//! processed: the codec never retries and never returns a partially built
//! packet. What to do next (drop the packet, close the connection, send a
//! disconnect) is the transport's decision.

use crate::Direction;

/// Errors that can occur while encoding, decoding, or dispatching packets.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serializing a value through the JSON codec failed.
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Parsing JSON through the JSON codec failed.
    ///
    /// Raised for the login chain document itself. Failures inside a
    /// single chain token surface as [`ProtocolError::InvalidTokenSegment`].
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// A variable-length integer kept its continuation bit set past the
    /// maximum width (5 bytes for 32-bit, 10 bytes for 64-bit values).
    #[error("malformed varint: no terminating byte within {max_bytes} bytes")]
    MalformedVarInt { max_bytes: usize },

    /// A read needed more bytes than the buffer has left.
    ///
    /// Length-prefixed strings, arrays, and raw byte runs check the
    /// declared length up front, so a hostile length never causes an
    /// out-of-bounds read or a huge allocation.
    #[error("truncated stream: needed {needed} bytes, {remaining} remaining")]
    TruncatedStream { needed: usize, remaining: usize },

    /// No codec is registered for this opcode in the requested direction.
    #[error("no {direction} codec registered for opcode {opcode:#04x}")]
    UnknownOpcode { opcode: u32, direction: Direction },

    /// The same opcode was registered twice for one direction.
    ///
    /// Only produced by `RegistryBuilder::build`, so a misconfigured
    /// registry is caught at startup instead of on the first packet.
    #[error("duplicate {direction} codec for opcode {opcode:#04x}")]
    DuplicateOpcode { opcode: u32, direction: Direction },

    /// The login JSON document has no `"chain"` key.
    #[error("login payload has no \"chain\" field")]
    MissingChainField,

    /// The login chain does not have exactly three tokens.
    #[error("login chain must have exactly 3 tokens, found {0}")]
    MalformedChain(usize),

    /// A chain token's payload segment is missing, is not base64, or does
    /// not parse as a chain-link JSON object.
    #[error("invalid token segment in chain element {index}: {reason}")]
    InvalidTokenSegment { index: usize, reason: String },

    /// A serializer was handed a packet of a different variant than the
    /// one registered under its opcode.
    #[error("opcode expects {expected} packet, got {found}")]
    PacketMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// A string field holds bytes that are not valid UTF-8.
    #[error("invalid utf-8 in string field: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    /// The value cannot be represented on the wire, e.g. a string longer
    /// than its length prefix can express.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
