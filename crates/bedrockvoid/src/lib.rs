//! # bedrockvoid
//!
//! Bedrock Edition packet codecs for a game server.
//!
//! The heavy lifting lives in [`bedrockvoid_protocol`]. This crate wraps the
//! opcode registry in a shareable [`PacketCodec`] handle and adds the
//! configuration and logging setup a server needs around it.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bedrockvoid::prelude::*;
//!
//! # fn main() -> Result<(), BedrockVoidError> {
//! let config = CodecConfig::from_env()?;
//! bedrockvoid::logging::init(&config.logging)?;
//!
//! let codec = PacketCodec::builder().config(config).build()?;
//! let body = codec.encode(&DisconnectPacket::default().into())?;
//! # let _ = body;
//! # Ok(())
//! # }
//! ```

mod codec;
mod config;
mod error;
pub mod logging;

pub use bedrockvoid_protocol as protocol;
pub use codec::{PacketCodec, PacketCodecBuilder};
pub use config::{CodecConfig, LoggingConfig};
pub use error::BedrockVoidError;

pub mod prelude {
    //! Everything needed to encode and decode packets.

    pub use crate::{BedrockVoidError, CodecConfig, LoggingConfig, PacketCodec, PacketCodecBuilder};
    pub use bedrockvoid_protocol::{
        ChainLink, CreativeContentPacket, Direction, DisconnectPacket, ExtraData,
        InboundHandshakePacket, InboundPacket, ItemData, JwtData, LoginPacket,
        OutboundHandshakePacket, OutboundPacket, PlayStatus, PlayStatusPacket, ProtocolError,
        ViolationWarningPacket,
    };
}
