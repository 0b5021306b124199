//! Integration tests for the `PacketCodec` handle shared across tasks.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use bedrockvoid::prelude::*;
use bedrockvoid::protocol::{DecodingStream, EncodingStream, JsonCodec};
use bytes::BytesMut;

// =========================================================================
// Helpers
// =========================================================================

fn token(claims: serde_json::Value) -> String {
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("eyJhbGciOiJFUzM4NCJ9.{payload}.c2ln")
}

fn login_body(player: &str) -> Vec<u8> {
    let chain = serde_json::json!({
        "chain": [
            token(serde_json::json!({ "certificateAuthority": true })),
            token(serde_json::json!({ "iss": "Mojang" })),
            token(serde_json::json!({ "extraData": { "displayName": player } })),
        ]
    })
    .to_string();

    let codec = JsonCodec;
    let mut block = BytesMut::new();
    {
        let mut stream = EncodingStream::new(&mut block, &codec);
        stream.encode_string_le(&chain).unwrap();
        stream.encode_string_le("skin").unwrap();
    }

    let mut body = BytesMut::new();
    let mut stream = EncodingStream::new(&mut body, &codec);
    stream.encode_int(431);
    stream.encode_var_uint(block.len() as u32);
    stream.encode_bytes(&block);
    body.to_vec()
}

// =========================================================================
// Round trips through the facade
// =========================================================================

#[test]
fn test_decode_login_through_facade() {
    let codec = PacketCodec::builder().build().unwrap();

    let InboundPacket::Login(login) = codec.decode(0x01, &login_body("Alex")).unwrap() else {
        panic!("expected login");
    };
    assert_eq!(login.protocol_version, 431);
    assert_eq!(login.chain_data.chain[2].display_name(), Some("Alex"));
    assert_eq!(login.skin_data, "skin");
}

#[test]
fn test_encode_handshake_reads_back() {
    let codec = PacketCodec::builder().build().unwrap();
    let packet = OutboundHandshakePacket {
        jwt_data: "h.p.s".into(),
    };

    let body = codec.encode(&packet.into()).unwrap();
    let mut stream = DecodingStream::new(body, codec.registry().codec());
    assert_eq!(stream.decode_string().unwrap(), "h.p.s");
}

#[test]
fn test_unknown_opcode_lifts_to_facade_error() {
    let codec = PacketCodec::builder().build().unwrap();
    let err = codec.decode(0x99, &[]).unwrap_err();
    assert!(matches!(
        err,
        BedrockVoidError::Protocol(ProtocolError::UnknownOpcode { opcode: 0x99, .. })
    ));
}

#[test]
fn test_config_from_json_drives_builder() {
    let config = CodecConfig::from_json(r#"{"trace_payloads": true}"#).unwrap();
    let codec = PacketCodec::builder().config(config).build().unwrap();
    assert!(codec.config().trace_payloads);
    assert_eq!(codec.config().logging.filter, "info");
}

// =========================================================================
// Concurrency
// =========================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_shared_codec_across_tasks() {
    let codec = PacketCodec::builder().build().unwrap();

    let mut handles = Vec::new();
    for i in 0..16 {
        let codec = codec.clone();
        handles.push(tokio::spawn(async move {
            let player = format!("player-{i}");
            let InboundPacket::Login(login) = codec.decode(0x01, &login_body(&player))? else {
                panic!("expected login");
            };

            let reply = DisconnectPacket {
                hide_disconnect_packet: false,
                kick_message: format!("bye {player}"),
            };
            let body = codec.encode(&reply.into())?;

            Ok::<_, BedrockVoidError>((
                login.chain_data.chain[2].display_name().map(str::to_owned),
                body.len(),
            ))
        }));
    }

    for (i, handle) in handles.into_iter().enumerate() {
        let (name, len) = handle.await.unwrap().unwrap();
        let expected = format!("player-{i}");
        assert_eq!(name.as_deref(), Some(expected.as_str()));
        // flag + one-byte length + "bye " + name
        assert_eq!(len, 2 + 4 + expected.len());
    }
}
