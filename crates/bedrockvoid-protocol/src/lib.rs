//! Wire protocol codecs for bedrockvoid.
//!
//! This crate turns packet bodies into typed values and back:
//!
//! - **VarInt** ([`VarInt`], [`VarLong`], [`varint`]): the base-128
//!   integer encoding used for lengths and counts.
//! - **Streams** ([`EncodingStream`], [`DecodingStream`]): the primitive
//!   read/write operations every packet layout is built from.
//! - **Packets** ([`InboundPacket`], [`OutboundPacket`] and the structs
//!   they wrap): plain data, no behaviour.
//! - **Registry** ([`Registry`]): opcode → serializer / deserializer.
//! - **Login** ([`login`]): the nested token chain inside the login packet.
//! - **Errors** ([`ProtocolError`]).
//!
//! # Architecture
//!
//! ```text
//! Transport (framed bytes, opcode) → Registry → stream → packet codec → typed packet
//! ```
//!
//! Framing, compression, encryption, and connection handling belong to the
//! transport. This crate only sees one packet body at a time.

mod codec;
mod error;
pub mod login;
mod packet;
mod registry;
pub mod serializers;
mod stream;
pub mod varint;

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use packet::{
    ChainLink, CreativeContentPacket, Direction, DisconnectPacket, ExtraData,
    InboundHandshakePacket, InboundPacket, ItemData, JwtData, LoginPacket,
    OutboundHandshakePacket, OutboundPacket, Packet, PlayStatus, PlayStatusPacket,
    ViolationWarningPacket,
};
pub use registry::{DeserializeFn, Registry, RegistryBuilder, SerializeFn};
pub use stream::{DecodingStream, EncodingStream};
pub use varint::{VarInt, VarLong};
