//! Packet catalog: the data shapes that travel on the wire.
//!
//! Every packet is a plain value with a fixed opcode and direction. None of
//! them know how to encode themselves; that lives in [`crate::serializers`]
//! and [`crate::login`], wired together by the [`crate::Registry`].
//!
//! ```text
//! opcode  dir  packet
//! 0x01    in   Login
//! 0x02    out  PlayStatus
//! 0x03    out  Handshake (server → client)
//! 0x04    in   Handshake (client → server)
//! 0x05    out  Disconnect
//! 0x91    out  CreativeContent
//! 0x9C    in   ViolationWarning
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

/// Which way a packet travels, seen from the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Client → server. Only deserializers exist for these.
    Inbound,
    /// Server → client. Only serializers exist for these.
    Outbound,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inbound => write!(f, "inbound"),
            Self::Outbound => write!(f, "outbound"),
        }
    }
}

/// Static metadata every packet type carries.
pub trait Packet {
    /// The opcode identifying this packet on the wire.
    const OPCODE: u32;
    /// The direction this packet travels.
    const DIRECTION: Direction;
    /// Human-readable name for logs and errors.
    const NAME: &'static str;
}

macro_rules! packet_meta {
    ($ty:ty, $opcode:expr, $direction:ident, $name:literal) => {
        impl Packet for $ty {
            const OPCODE: u32 = $opcode;
            const DIRECTION: Direction = Direction::$direction;
            const NAME: &'static str = $name;
        }
    };
}

// ---------------------------------------------------------------------------
// Login (inbound)
// ---------------------------------------------------------------------------

/// The first packet a client sends after the network handshake.
///
/// Carries the protocol version, the decoded identity chain, and the raw
/// client/skin data token. The chain signatures are NOT verified here;
/// callers that need trust must verify the original tokens elsewhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginPacket {
    pub protocol_version: i32,
    pub chain_data: JwtData,
    pub skin_data: String,
}

/// The three decoded links of the login chain, in wire order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JwtData {
    pub chain: [ChainLink; 3],
}

impl JwtData {
    /// The first link that carries `extraData`, i.e. the one describing
    /// the player's identity.
    pub fn identity(&self) -> Option<&ExtraData> {
        self.chain.iter().find_map(|link| link.extra_data.as_ref())
    }
}

/// Claims decoded from the payload segment of one chain token.
///
/// Each link of the chain carries a different subset of claims, so every
/// field is optional. Unknown claims are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainLink {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_authority: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub random_nonce: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity_public_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_data: Option<ExtraData>,
}

impl ChainLink {
    /// Display name from `extraData`, if this link has one.
    pub fn display_name(&self) -> Option<&str> {
        self.extra_data.as_ref()?.display_name.as_deref()
    }

    /// Xbox user id from `extraData`, if this link has one.
    pub fn xuid(&self) -> Option<&str> {
        self.extra_data.as_ref()?.xuid.as_deref()
    }
}

/// Player identity claims carried by the last link of an authenticated
/// chain.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtraData {
    #[serde(rename = "XUID", default, skip_serializing_if = "Option::is_none")]
    pub xuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_id: Option<String>,
}

packet_meta!(LoginPacket, 0x01, Inbound, "Login");

// ---------------------------------------------------------------------------
// Play status (outbound)
// ---------------------------------------------------------------------------

/// Tells the client how far login/spawn has progressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayStatusPacket {
    pub status: PlayStatus,
}

/// Status values; the ordinal is what goes on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayStatus {
    LoginSuccess,
    FailedClient,
    FailedSpawn,
    PlayerSpawn,
    FailedInvalidTenant,
    FailedVanillaEdu,
    FailedIncompatible,
    FailedServerFull,
}

impl PlayStatus {
    const ALL: [Self; 8] = [
        Self::LoginSuccess,
        Self::FailedClient,
        Self::FailedSpawn,
        Self::PlayerSpawn,
        Self::FailedInvalidTenant,
        Self::FailedVanillaEdu,
        Self::FailedIncompatible,
        Self::FailedServerFull,
    ];

    /// Position of the variant in declaration order.
    pub fn ordinal(self) -> i32 {
        self as i32
    }

    /// Reverse of [`PlayStatus::ordinal`].
    pub fn from_ordinal(ordinal: i32) -> Option<Self> {
        usize::try_from(ordinal)
            .ok()
            .and_then(|index| Self::ALL.get(index).copied())
    }
}

packet_meta!(PlayStatusPacket, 0x02, Outbound, "PlayStatus");

// ---------------------------------------------------------------------------
// Handshakes
// ---------------------------------------------------------------------------

/// Server → client handshake carrying the server's signed token.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OutboundHandshakePacket {
    pub jwt_data: String,
}

/// Client → server handshake acknowledgement. Has no body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InboundHandshakePacket;

packet_meta!(OutboundHandshakePacket, 0x03, Outbound, "OutboundHandshake");
packet_meta!(InboundHandshakePacket, 0x04, Inbound, "InboundHandshake");

// ---------------------------------------------------------------------------
// Disconnect (outbound)
// ---------------------------------------------------------------------------

/// Kicks the client with an optional on-screen message.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DisconnectPacket {
    /// When `true` the client skips the disconnect screen.
    pub hide_disconnect_packet: bool,
    pub kick_message: String,
}

packet_meta!(DisconnectPacket, 0x05, Outbound, "Disconnect");

// ---------------------------------------------------------------------------
// Creative content (outbound)
// ---------------------------------------------------------------------------

/// The creative inventory listing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CreativeContentPacket {
    pub content: Vec<ItemData>,
}

/// One creative inventory entry.
///
/// The item's own layout belongs to the item subsystem; the codec writes
/// `entry_id` as a var uint and then copies `raw` through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ItemData {
    pub entry_id: u32,
    pub raw: Vec<u8>,
}

packet_meta!(CreativeContentPacket, 0x91, Outbound, "CreativeContent");

// ---------------------------------------------------------------------------
// Violation warning (inbound)
// ---------------------------------------------------------------------------

/// Client-reported packet violation. Only its arrival is recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViolationWarningPacket;

packet_meta!(ViolationWarningPacket, 0x9c, Inbound, "ViolationWarning");

// ---------------------------------------------------------------------------
// Tagged unions
// ---------------------------------------------------------------------------

/// Every packet the server can receive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundPacket {
    Login(LoginPacket),
    Handshake(InboundHandshakePacket),
    ViolationWarning(ViolationWarningPacket),
}

impl InboundPacket {
    /// Opcode of the wrapped packet.
    pub fn opcode(&self) -> u32 {
        match self {
            Self::Login(_) => LoginPacket::OPCODE,
            Self::Handshake(_) => InboundHandshakePacket::OPCODE,
            Self::ViolationWarning(_) => ViolationWarningPacket::OPCODE,
        }
    }

    /// Name of the wrapped packet.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Login(_) => LoginPacket::NAME,
            Self::Handshake(_) => InboundHandshakePacket::NAME,
            Self::ViolationWarning(_) => ViolationWarningPacket::NAME,
        }
    }
}

/// Every packet the server can send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundPacket {
    PlayStatus(PlayStatusPacket),
    Handshake(OutboundHandshakePacket),
    Disconnect(DisconnectPacket),
    CreativeContent(CreativeContentPacket),
}

impl OutboundPacket {
    /// Opcode of the wrapped packet.
    pub fn opcode(&self) -> u32 {
        match self {
            Self::PlayStatus(_) => PlayStatusPacket::OPCODE,
            Self::Handshake(_) => OutboundHandshakePacket::OPCODE,
            Self::Disconnect(_) => DisconnectPacket::OPCODE,
            Self::CreativeContent(_) => CreativeContentPacket::OPCODE,
        }
    }

    /// Name of the wrapped packet.
    pub fn name(&self) -> &'static str {
        match self {
            Self::PlayStatus(_) => PlayStatusPacket::NAME,
            Self::Handshake(_) => OutboundHandshakePacket::NAME,
            Self::Disconnect(_) => DisconnectPacket::NAME,
            Self::CreativeContent(_) => CreativeContentPacket::NAME,
        }
    }
}

macro_rules! wrap {
    ($enum:ident :: $variant:ident ($ty:ty)) => {
        impl From<$ty> for $enum {
            fn from(packet: $ty) -> Self {
                $enum::$variant(packet)
            }
        }
    };
}

wrap!(InboundPacket::Login(LoginPacket));
wrap!(InboundPacket::Handshake(InboundHandshakePacket));
wrap!(InboundPacket::ViolationWarning(ViolationWarningPacket));
wrap!(OutboundPacket::PlayStatus(PlayStatusPacket));
wrap!(OutboundPacket::Handshake(OutboundHandshakePacket));
wrap!(OutboundPacket::Disconnect(DisconnectPacket));
wrap!(OutboundPacket::CreativeContent(CreativeContentPacket));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opcodes_match_wire_table() {
        assert_eq!(LoginPacket::OPCODE, 0x01);
        assert_eq!(PlayStatusPacket::OPCODE, 0x02);
        assert_eq!(OutboundHandshakePacket::OPCODE, 0x03);
        assert_eq!(InboundHandshakePacket::OPCODE, 0x04);
        assert_eq!(DisconnectPacket::OPCODE, 0x05);
        assert_eq!(CreativeContentPacket::OPCODE, 0x91);
        assert_eq!(ViolationWarningPacket::OPCODE, 0x9c);
    }

    #[test]
    fn test_directions() {
        assert_eq!(LoginPacket::DIRECTION, Direction::Inbound);
        assert_eq!(DisconnectPacket::DIRECTION, Direction::Outbound);
        assert_eq!(Direction::Inbound.to_string(), "inbound");
    }

    #[test]
    fn test_enum_opcode_follows_variant() {
        let packet: OutboundPacket = DisconnectPacket::default().into();
        assert_eq!(packet.opcode(), 0x05);
        assert_eq!(packet.name(), "Disconnect");

        let packet: InboundPacket = ViolationWarningPacket.into();
        assert_eq!(packet.opcode(), 0x9c);
    }

    #[test]
    fn test_play_status_ordinals() {
        assert_eq!(PlayStatus::LoginSuccess.ordinal(), 0);
        assert_eq!(PlayStatus::PlayerSpawn.ordinal(), 3);
        assert_eq!(PlayStatus::FailedServerFull.ordinal(), 7);
        assert_eq!(PlayStatus::from_ordinal(3), Some(PlayStatus::PlayerSpawn));
        assert_eq!(PlayStatus::from_ordinal(8), None);
        assert_eq!(PlayStatus::from_ordinal(-1), None);
    }

    #[test]
    fn test_chain_link_reads_camel_case_claims() {
        let json = r#"{
            "certificateAuthority": true,
            "exp": 1700000000,
            "identityPublicKey": "MHYw",
            "extraData": {"XUID": "2535", "displayName": "Steve", "identity": "uuid"},
            "somethingElse": 1
        }"#;
        let link: ChainLink = serde_json::from_str(json).unwrap();

        assert_eq!(link.certificate_authority, Some(true));
        assert_eq!(link.exp, Some(1_700_000_000));
        assert_eq!(link.identity_public_key.as_deref(), Some("MHYw"));
        assert_eq!(link.display_name(), Some("Steve"));
        assert_eq!(link.xuid(), Some("2535"));
        assert!(link.iss.is_none());
    }

    #[test]
    fn test_jwt_data_identity_finds_extra_data() {
        let with_identity = ChainLink {
            extra_data: Some(ExtraData {
                display_name: Some("Alex".into()),
                ..ExtraData::default()
            }),
            ..ChainLink::default()
        };
        let data = JwtData {
            chain: [ChainLink::default(), ChainLink::default(), with_identity],
        };
        assert_eq!(
            data.identity().and_then(|e| e.display_name.as_deref()),
            Some("Alex")
        );
    }
}
