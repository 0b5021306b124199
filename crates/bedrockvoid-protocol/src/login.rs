//! Login packet decoding.
//!
//! The login body nests three formats inside each other:
//!
//! ```text
//! i32 BE protocol version
//! var-uint length ─┐
//!                  └─ token block
//!                     ├─ u32 LE length + JSON  {"chain": [tok0, tok1, tok2]}
//!                     │                         tok = header.payload.signature
//!                     │                                        └─ base64 JSON → ChainLink
//!                     └─ u32 LE length + skin data (kept as the raw string)
//! ```
//!
//! Only the payload segment of each chain token is decoded. Signatures are
//! not checked; a caller that needs to trust the identity must verify the
//! tokens itself.

use std::collections::HashMap;

use base64::Engine as _;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};

use crate::codec::Codec;
use crate::packet::{ChainLink, JwtData, LoginPacket};
use crate::stream::DecodingStream;
use crate::ProtocolError;

/// Number of tokens a login chain must contain.
pub const CHAIN_LENGTH: usize = 3;

const LENIENT: GeneralPurposeConfig =
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent);

const STANDARD: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, LENIENT);
const URL_SAFE: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, LENIENT);

/// Reads a login packet body.
///
/// # Errors
/// Stream errors propagate unchanged. The chain adds
/// `MissingChainField`, `MalformedChain`, and `InvalidTokenSegment`.
pub fn read_login<C: Codec>(
    stream: &mut DecodingStream<'_, C>,
) -> Result<LoginPacket, ProtocolError> {
    let protocol_version = stream.decode_int()?;

    let block_len = stream.decode_var_uint()? as usize;
    let mut block = stream.decode_slice(block_len)?;

    let chain_json = block.decode_string_le()?;
    let chain_data = decode_chain(block.codec(), &chain_json)?;
    let skin_data = block.decode_string_le()?;

    tracing::trace!(protocol_version, "decoded login chain");

    Ok(LoginPacket {
        protocol_version,
        chain_data,
        skin_data,
    })
}

/// Parses the chain document and decodes the payload of each token.
pub fn decode_chain<C: Codec>(codec: &C, json: &str) -> Result<JwtData, ProtocolError> {
    let mut document: HashMap<String, Vec<String>> = codec.decode(json.as_bytes())?;
    let tokens = document
        .remove("chain")
        .ok_or(ProtocolError::MissingChainField)?;

    let [first, second, third]: [String; CHAIN_LENGTH] = tokens
        .try_into()
        .map_err(|tokens: Vec<String>| ProtocolError::MalformedChain(tokens.len()))?;

    Ok(JwtData {
        chain: [
            decode_token_payload(codec, 0, &first)?,
            decode_token_payload(codec, 1, &second)?,
            decode_token_payload(codec, 2, &third)?,
        ],
    })
}

/// Decodes segment 1 of a `header.payload.signature` token into a
/// [`ChainLink`]. `index` is the token's position in the chain, used for
/// error reporting.
pub fn decode_token_payload<C: Codec>(
    codec: &C,
    index: usize,
    token: &str,
) -> Result<ChainLink, ProtocolError> {
    let invalid = |reason: String| ProtocolError::InvalidTokenSegment { index, reason };

    let segment = token
        .split('.')
        .nth(1)
        .ok_or_else(|| invalid("token has no payload segment".into()))?;

    let payload = decode_base64(segment).map_err(|e| invalid(format!("bad base64: {e}")))?;

    codec
        .decode(&payload)
        .map_err(|e| invalid(format!("bad payload json: {e}")))
}

// Clients emit URL-safe unpadded segments; the standard alphabet is also
// accepted since both appear in the wild.
fn decode_base64(segment: &str) -> Result<Vec<u8>, base64::DecodeError> {
    if segment.contains(['-', '_']) {
        URL_SAFE.decode(segment)
    } else {
        STANDARD.decode(segment)
    }
}
