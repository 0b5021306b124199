//! Per-packet wire layouts.
//!
//! Outbound packets get a `write_*` function, inbound packets a `read_*`
//! function. Only the direction a packet actually travels is implemented.
//! The login packet's reader lives in [`crate::login`].

use crate::codec::Codec;
use crate::packet::{
    CreativeContentPacket, DisconnectPacket, InboundHandshakePacket, ItemData,
    OutboundHandshakePacket, PlayStatusPacket, ViolationWarningPacket,
};
use crate::stream::{DecodingStream, EncodingStream};
use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Outbound
// ---------------------------------------------------------------------------

/// `i32` (big-endian) status ordinal.
pub fn write_play_status<C: Codec>(
    stream: &mut EncodingStream<'_, C>,
    packet: &PlayStatusPacket,
) -> Result<(), ProtocolError> {
    stream.encode_int(packet.status.ordinal());
    Ok(())
}

/// Var-uint-length token string.
pub fn write_outbound_handshake<C: Codec>(
    stream: &mut EncodingStream<'_, C>,
    packet: &OutboundHandshakePacket,
) -> Result<(), ProtocolError> {
    stream.encode_string(&packet.jwt_data)
}

/// Bool flag, then var-uint-length message.
pub fn write_disconnect<C: Codec>(
    stream: &mut EncodingStream<'_, C>,
    packet: &DisconnectPacket,
) -> Result<(), ProtocolError> {
    stream.encode_bool(packet.hide_disconnect_packet);
    stream.encode_string(&packet.kick_message)
}

/// Var-uint count, then each item record.
pub fn write_creative_content<C: Codec>(
    stream: &mut EncodingStream<'_, C>,
    packet: &CreativeContentPacket,
) -> Result<(), ProtocolError> {
    stream.encode_array(&packet.content, write_item)
}

fn write_item<C: Codec>(
    stream: &mut EncodingStream<'_, C>,
    item: &ItemData,
) -> Result<(), ProtocolError> {
    stream.encode_var_uint(item.entry_id);
    stream.encode_bytes(&item.raw);
    Ok(())
}

// ---------------------------------------------------------------------------
// Inbound
// ---------------------------------------------------------------------------

/// Empty body.
pub fn read_inbound_handshake<C: Codec>(
    _stream: &mut DecodingStream<'_, C>,
) -> Result<InboundHandshakePacket, ProtocolError> {
    Ok(InboundHandshakePacket)
}

/// Empty body; whatever the client sent after the opcode is ignored.
pub fn read_violation_warning<C: Codec>(
    _stream: &mut DecodingStream<'_, C>,
) -> Result<ViolationWarningPacket, ProtocolError> {
    Ok(ViolationWarningPacket)
}

#[cfg(test)]
mod tests {
    use bytes::BytesMut;

    use super::*;
    use crate::codec::JsonCodec;
    use crate::packet::PlayStatus;

    fn written<F>(write: F) -> Vec<u8>
    where
        F: FnOnce(&mut EncodingStream<'_>) -> Result<(), ProtocolError>,
    {
        let mut buf = BytesMut::new();
        write(&mut EncodingStream::new(&mut buf, &JsonCodec)).unwrap();
        buf.to_vec()
    }

    #[test]
    fn test_play_status_writes_big_endian_ordinal() {
        let packet = PlayStatusPacket {
            status: PlayStatus::PlayerSpawn,
        };
        assert_eq!(written(|s| write_play_status(s, &packet)), [0, 0, 0, 3]);
    }

    #[test]
    fn test_outbound_handshake_writes_prefixed_token() {
        let packet = OutboundHandshakePacket {
            jwt_data: "a.b.c".into(),
        };
        assert_eq!(
            written(|s| write_outbound_handshake(s, &packet)),
            b"\x05a.b.c"
        );
    }

    #[test]
    fn test_disconnect_layout() {
        let packet = DisconnectPacket {
            hide_disconnect_packet: true,
            kick_message: "bye".into(),
        };
        assert_eq!(
            written(|s| write_disconnect(s, &packet)),
            [0x01, 0x03, b'b', b'y', b'e']
        );
    }

    #[test]
    fn test_creative_content_items() {
        let packet = CreativeContentPacket {
            content: vec![
                ItemData {
                    entry_id: 1,
                    raw: vec![0xaa],
                },
                ItemData {
                    entry_id: 200,
                    raw: vec![],
                },
            ],
        };
        assert_eq!(
            written(|s| write_creative_content(s, &packet)),
            [0x02, 0x01, 0xaa, 0xc8, 0x01]
        );
    }

    #[test]
    fn test_empty_creative_content_is_single_zero_byte() {
        let packet = CreativeContentPacket::default();
        assert_eq!(written(|s| write_creative_content(s, &packet)), [0x00]);
    }
}
