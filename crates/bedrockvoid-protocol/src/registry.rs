//! Opcode registry and dispatch.
//!
//! The registry is two lookup tables of plain function pointers, one per
//! direction, keyed by opcode. It is assembled once through
//! [`RegistryBuilder`] and never mutated afterwards, so an
//! `Arc<Registry>` can be shared by every connection task without locks.
//!
//! ```rust
//! use bedrockvoid_protocol::{
//!     DisconnectPacket, InboundPacket, JsonCodec, OutboundPacket, Registry,
//! };
//!
//! let registry = Registry::builder(JsonCodec).with_default_packets().build().unwrap();
//!
//! let bytes = registry
//!     .serialize_packet(&OutboundPacket::from(DisconnectPacket {
//!         hide_disconnect_packet: false,
//!         kick_message: "server closed".into(),
//!     }))
//!     .unwrap();
//! assert_eq!(bytes[0], 0x00);
//!
//! let packet = registry.deserialize(0x04, &[]).unwrap();
//! assert!(matches!(packet, InboundPacket::Handshake(_)));
//! ```

use std::collections::HashMap;

use bytes::{Bytes, BytesMut};

use crate::codec::{Codec, JsonCodec};
use crate::login::read_login;
use crate::packet::{
    CreativeContentPacket, Direction, DisconnectPacket, InboundHandshakePacket, InboundPacket,
    LoginPacket, OutboundHandshakePacket, OutboundPacket, Packet, PlayStatusPacket,
    ViolationWarningPacket,
};
use crate::serializers::{
    read_inbound_handshake, read_violation_warning, write_creative_content, write_disconnect,
    write_outbound_handshake, write_play_status,
};
use crate::stream::{DecodingStream, EncodingStream};
use crate::ProtocolError;

/// Writes one outbound packet's body.
pub type SerializeFn<C> =
    fn(&mut EncodingStream<'_, C>, &OutboundPacket) -> Result<(), ProtocolError>;

/// Reads one inbound packet's body.
pub type DeserializeFn<C> = fn(&mut DecodingStream<'_, C>) -> Result<InboundPacket, ProtocolError>;

// Adapts a typed `write_*` function to the `OutboundPacket` table entry.
macro_rules! serializer {
    ($variant:ident, $packet:ty, $write:ident) => {{
        fn adapter<C: Codec>(
            stream: &mut EncodingStream<'_, C>,
            packet: &OutboundPacket,
        ) -> Result<(), ProtocolError> {
            match packet {
                OutboundPacket::$variant(inner) => $write(stream, inner),
                other => Err(ProtocolError::PacketMismatch {
                    expected: <$packet as Packet>::NAME,
                    found: other.name(),
                }),
            }
        }
        (<$packet as Packet>::OPCODE, adapter::<C> as SerializeFn<C>)
    }};
}

// Adapts a typed `read_*` function to the `InboundPacket` table entry.
macro_rules! deserializer {
    ($variant:ident, $packet:ty, $read:ident) => {{
        fn adapter<C: Codec>(
            stream: &mut DecodingStream<'_, C>,
        ) -> Result<InboundPacket, ProtocolError> {
            $read(stream).map(InboundPacket::$variant)
        }
        (<$packet as Packet>::OPCODE, adapter::<C> as DeserializeFn<C>)
    }};
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Collects codec registrations and validates them in [`build`](Self::build).
///
/// Registration order does not matter. Registering an opcode twice for the
/// same direction is recorded and reported by `build`, so a bad table
/// stops startup instead of surfacing on some later packet.
pub struct RegistryBuilder<C: Codec = JsonCodec> {
    codec: C,
    serializers: HashMap<u32, SerializeFn<C>>,
    deserializers: HashMap<u32, DeserializeFn<C>>,
    duplicates: Vec<(u32, Direction)>,
}

impl<C: Codec> RegistryBuilder<C> {
    /// Creates an empty builder that will own `codec`.
    pub fn new(codec: C) -> Self {
        Self {
            codec,
            serializers: HashMap::new(),
            deserializers: HashMap::new(),
            duplicates: Vec::new(),
        }
    }

    /// Registers the serializer for an outbound opcode.
    pub fn serializer(mut self, opcode: u32, write: SerializeFn<C>) -> Self {
        if self.serializers.insert(opcode, write).is_some() {
            self.duplicates.push((opcode, Direction::Outbound));
        }
        self
    }

    /// Registers the deserializer for an inbound opcode.
    pub fn deserializer(mut self, opcode: u32, read: DeserializeFn<C>) -> Self {
        if self.deserializers.insert(opcode, read).is_some() {
            self.duplicates.push((opcode, Direction::Inbound));
        }
        self
    }

    /// Registers the full packet catalog.
    pub fn with_default_packets(self) -> Self {
        let outbound = [
            serializer!(PlayStatus, PlayStatusPacket, write_play_status),
            serializer!(Handshake, OutboundHandshakePacket, write_outbound_handshake),
            serializer!(Disconnect, DisconnectPacket, write_disconnect),
            serializer!(CreativeContent, CreativeContentPacket, write_creative_content),
        ];
        let inbound = [
            deserializer!(Login, LoginPacket, read_login),
            deserializer!(Handshake, InboundHandshakePacket, read_inbound_handshake),
            deserializer!(ViolationWarning, ViolationWarningPacket, read_violation_warning),
        ];

        let builder = outbound
            .into_iter()
            .fold(self, |builder, (opcode, write)| builder.serializer(opcode, write));
        inbound
            .into_iter()
            .fold(builder, |builder, (opcode, read)| builder.deserializer(opcode, read))
    }

    /// Validates the tables and produces the read-only registry.
    ///
    /// # Errors
    /// `DuplicateOpcode` for the first opcode registered twice in one
    /// direction.
    pub fn build(self) -> Result<Registry<C>, ProtocolError> {
        if let Some(&(opcode, direction)) = self.duplicates.first() {
            return Err(ProtocolError::DuplicateOpcode { opcode, direction });
        }

        tracing::debug!(
            serializers = self.serializers.len(),
            deserializers = self.deserializers.len(),
            "packet registry built"
        );

        Ok(Registry {
            codec: self.codec,
            serializers: self.serializers,
            deserializers: self.deserializers,
        })
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Read-only opcode → codec tables plus the JSON codec lent to streams.
pub struct Registry<C: Codec = JsonCodec> {
    codec: C,
    serializers: HashMap<u32, SerializeFn<C>>,
    deserializers: HashMap<u32, DeserializeFn<C>>,
}

impl<C: Codec> Registry<C> {
    /// Starts a new builder.
    pub fn builder(codec: C) -> RegistryBuilder<C> {
        RegistryBuilder::new(codec)
    }

    /// The JSON codec every stream created by this registry borrows.
    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Encodes `packet` with the serializer registered for `opcode`.
    ///
    /// The returned bytes do not include the opcode; prefixing it is the
    /// transport's job.
    ///
    /// # Errors
    /// `UnknownOpcode` if nothing is registered, `PacketMismatch` if
    /// `packet` is not the variant registered under `opcode`, or whatever
    /// the serializer reports.
    pub fn serialize(&self, opcode: u32, packet: &OutboundPacket) -> Result<Bytes, ProtocolError> {
        let write = self
            .serializers
            .get(&opcode)
            .ok_or(ProtocolError::UnknownOpcode {
                opcode,
                direction: Direction::Outbound,
            })?;

        let mut buf = BytesMut::new();
        write(&mut EncodingStream::new(&mut buf, &self.codec), packet)?;

        tracing::trace!(opcode, len = buf.len(), packet = packet.name(), "serialized packet");
        Ok(buf.freeze())
    }

    /// Encodes `packet` under its own opcode.
    pub fn serialize_packet(&self, packet: &OutboundPacket) -> Result<Bytes, ProtocolError> {
        self.serialize(packet.opcode(), packet)
    }

    /// Decodes a packet body with the deserializer registered for `opcode`.
    ///
    /// # Errors
    /// `UnknownOpcode` if nothing is registered; stream and login errors
    /// propagate unchanged.
    pub fn deserialize(&self, opcode: u32, data: &[u8]) -> Result<InboundPacket, ProtocolError> {
        self.deserialize_bytes(opcode, Bytes::copy_from_slice(data))
    }

    /// Like [`deserialize`](Self::deserialize), without copying `data`.
    pub fn deserialize_bytes(
        &self,
        opcode: u32,
        data: Bytes,
    ) -> Result<InboundPacket, ProtocolError> {
        let read = self
            .deserializers
            .get(&opcode)
            .ok_or(ProtocolError::UnknownOpcode {
                opcode,
                direction: Direction::Inbound,
            })?;

        let len = data.len();
        let packet = read(&mut DecodingStream::new(data, &self.codec))?;

        tracing::trace!(opcode, len, packet = packet.name(), "deserialized packet");
        Ok(packet)
    }

    /// `true` if an outbound codec exists for `opcode`.
    pub fn has_serializer(&self, opcode: u32) -> bool {
        self.serializers.contains_key(&opcode)
    }

    /// `true` if an inbound codec exists for `opcode`.
    pub fn has_deserializer(&self, opcode: u32) -> bool {
        self.deserializers.contains_key(&opcode)
    }

    /// Registered opcodes for one direction, ascending.
    pub fn opcodes(&self, direction: Direction) -> Vec<u32> {
        let mut opcodes: Vec<u32> = match direction {
            Direction::Inbound => self.deserializers.keys().copied().collect(),
            Direction::Outbound => self.serializers.keys().copied().collect(),
        };
        opcodes.sort_unstable();
        opcodes
    }
}

impl Registry<JsonCodec> {
    /// The full packet catalog over [`JsonCodec`].
    ///
    /// # Errors
    /// Only if the built-in table itself is inconsistent.
    pub fn standard() -> Result<Self, ProtocolError> {
        Self::builder(JsonCodec).with_default_packets().build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::{PlayStatus, ViolationWarningPacket};

    fn noop_reader(
        _: &mut DecodingStream<'_, JsonCodec>,
    ) -> Result<InboundPacket, ProtocolError> {
        Ok(InboundPacket::ViolationWarning(ViolationWarningPacket))
    }

    #[test]
    fn test_standard_registry_opcodes() {
        let registry = Registry::standard().unwrap();
        assert_eq!(
            registry.opcodes(Direction::Outbound),
            vec![0x02, 0x03, 0x05, 0x91]
        );
        assert_eq!(
            registry.opcodes(Direction::Inbound),
            vec![0x01, 0x04, 0x9c]
        );
    }

    #[test]
    fn test_directions_stay_asymmetric() {
        let registry = Registry::standard().unwrap();
        assert!(registry.has_serializer(0x05));
        assert!(!registry.has_deserializer(0x05));
        assert!(registry.has_deserializer(0x01));
        assert!(!registry.has_serializer(0x01));
    }

    #[test]
    fn test_duplicate_registration_fails_at_build() {
        let result = Registry::builder(JsonCodec)
            .with_default_packets()
            .deserializer(0x04, noop_reader)
            .build();
        assert!(matches!(
            result,
            Err(ProtocolError::DuplicateOpcode {
                opcode: 0x04,
                direction: Direction::Inbound
            })
        ));
    }

    #[test]
    fn test_same_opcode_in_both_directions_is_allowed() {
        let registry = Registry::builder(JsonCodec)
            .with_default_packets()
            .deserializer(0x05, noop_reader)
            .build()
            .unwrap();
        assert!(registry.has_serializer(0x05));
        assert!(registry.has_deserializer(0x05));
    }

    #[test]
    fn test_unknown_outbound_opcode() {
        let registry = Registry::standard().unwrap();
        let packet = OutboundPacket::from(DisconnectPacket::default());
        assert!(matches!(
            registry.serialize(0x42, &packet),
            Err(ProtocolError::UnknownOpcode {
                opcode: 0x42,
                direction: Direction::Outbound
            })
        ));
    }

    #[test]
    fn test_serializer_rejects_other_variant() {
        let registry = Registry::standard().unwrap();
        let packet = OutboundPacket::from(PlayStatusPacket {
            status: PlayStatus::LoginSuccess,
        });
        let err = registry.serialize(0x05, &packet).unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::PacketMismatch {
                expected: "Disconnect",
                found: "PlayStatus"
            }
        ));
    }

    #[test]
    fn test_registry_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Registry<JsonCodec>>();
    }
}
