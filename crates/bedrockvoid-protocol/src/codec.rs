//! JSON codec seam used by packet (de)serializers.
//!
//! Several packets embed JSON documents inside their binary layout (the
//! login chain and each of its token payloads). Packet codecs never call
//! `serde_json` directly; they go through the [`Codec`] lent to them by
//! their stream. The registry owns one codec value and threads a borrow of
//! it into every stream it creates, so there is no global JSON instance.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// A codec that turns Rust values into JSON bytes and back.
///
/// `Send + Sync + 'static` because the registry that owns it is shared
/// across every connection task of the transport.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if the value cannot be represented.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed or don't
    /// match the shape of `T`.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// The default [`Codec`], backed by `serde_json`.
///
/// ```rust
/// use bedrockvoid_protocol::{Codec, JsonCodec, ChainLink};
///
/// let codec = JsonCodec;
/// let link: ChainLink = codec.decode(br#"{"iss":"Mojang"}"#).unwrap();
/// assert_eq!(link.iss.as_deref(), Some("Mojang"));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
