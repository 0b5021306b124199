//! `PacketCodec` builder and handle.
//!
//! The handle is what connection tasks hold: a shared, read-only registry
//! plus the codec configuration. Cloning it is a pair of `Arc` bumps.

use std::sync::Arc;

use bedrockvoid_protocol::{Direction, InboundPacket, OutboundPacket, Registry};
use bytes::Bytes;

use crate::{BedrockVoidError, CodecConfig};

/// Builder for a [`PacketCodec`].
///
/// # Example
///
/// ```rust
/// use bedrockvoid::prelude::*;
///
/// let codec = PacketCodec::builder()
///     .config(CodecConfig::default())
///     .build()?;
/// assert!(codec.registry().has_deserializer(0x01));
/// # Ok::<(), BedrockVoidError>(())
/// ```
pub struct PacketCodecBuilder {
    config: CodecConfig,
    registry: Option<Registry>,
}

impl PacketCodecBuilder {
    /// Creates a builder with the default config and the standard catalog.
    pub fn new() -> Self {
        Self {
            config: CodecConfig::default(),
            registry: None,
        }
    }

    /// Sets the configuration.
    pub fn config(mut self, config: CodecConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the standard catalog with a custom registry.
    pub fn registry(mut self, registry: Registry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Validates the config and builds the handle.
    ///
    /// # Errors
    /// [`BedrockVoidError::Config`] if validation fails, or a protocol
    /// error if the standard catalog cannot be built.
    pub fn build(self) -> Result<PacketCodec, BedrockVoidError> {
        self.config.validate_strict()?;

        let registry = match self.registry {
            Some(registry) => registry,
            None => Registry::standard()?,
        };

        tracing::debug!(
            outbound = registry.opcodes(Direction::Outbound).len(),
            inbound = registry.opcodes(Direction::Inbound).len(),
            trace_payloads = self.config.trace_payloads,
            "packet codec ready"
        );

        Ok(PacketCodec {
            registry: Arc::new(registry),
            config: Arc::new(self.config),
        })
    }
}

impl Default for PacketCodecBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Shareable encode/decode handle over one packet registry.
#[derive(Clone)]
pub struct PacketCodec {
    registry: Arc<Registry>,
    config: Arc<CodecConfig>,
}

impl PacketCodec {
    /// Creates a new builder.
    pub fn builder() -> PacketCodecBuilder {
        PacketCodecBuilder::new()
    }

    /// The underlying registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The configuration this handle was built with.
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Encodes an outbound packet body under its own opcode.
    pub fn encode(&self, packet: &OutboundPacket) -> Result<Bytes, BedrockVoidError> {
        let opcode = packet.opcode();
        let body = self.registry.serialize(opcode, packet).inspect_err(|e| {
            tracing::debug!(opcode, packet = packet.name(), error = %e, "packet encode failed");
        })?;

        self.trace_payload(Direction::Outbound, opcode, &body);
        Ok(body)
    }

    /// Decodes an inbound packet body received under `opcode`.
    pub fn decode(&self, opcode: u32, data: &[u8]) -> Result<InboundPacket, BedrockVoidError> {
        let packet = self.registry.deserialize(opcode, data).inspect_err(|e| {
            tracing::debug!(opcode, len = data.len(), error = %e, "packet decode failed");
        })?;

        self.trace_payload(Direction::Inbound, opcode, data);
        Ok(packet)
    }

    fn trace_payload(&self, direction: Direction, opcode: u32, body: &[u8]) {
        if self.config.trace_payloads {
            tracing::trace!(%direction, opcode, payload = ?body, "packet payload");
        }
    }
}
