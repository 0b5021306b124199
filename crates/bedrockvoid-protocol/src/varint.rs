//! Variable-length integers (VarInt / VarLong).
//!
//! Values are split into 7-bit groups, least-significant group first. Every
//! byte except the last has its high bit (`0x80`) set:
//!
//! ```text
//! 300 = 0b1_0010_1100  →  [0xAC, 0x02]
//!        └─ low 7 bits 0x2C | 0x80, then 300 >> 7 = 2
//! ```
//!
//! Only unsigned values are encoded here. Signed fields are zig-zag mapped
//! by the caller with [`zigzag_encode_32`] and friends before writing.

use std::fmt;

use bytes::{Buf, BufMut};

use crate::ProtocolError;

/// Maximum encoded size of a 32-bit value.
pub const MAX_VARINT_LEN: usize = 5;

/// Maximum encoded size of a 64-bit value.
pub const MAX_VARLONG_LEN: usize = 10;

const SEGMENT_BITS: u8 = 0x7f;
const CONTINUE_BIT: u8 = 0x80;

/// A 32-bit value destined for variable-length encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct VarInt(pub u32);

impl VarInt {
    /// Writes the value to `buf`.
    pub fn write(self, buf: &mut impl BufMut) {
        write_var_u32(buf, self.0);
    }

    /// Reads a value from `buf`.
    pub fn read(buf: &mut impl Buf) -> Result<Self, ProtocolError> {
        read_var_u32(buf).map(Self)
    }

    /// Number of bytes [`VarInt::write`] will produce.
    pub fn written_len(self) -> usize {
        var_u32_len(self.0)
    }
}

impl From<u32> for VarInt {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl fmt::Display for VarInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A 64-bit value destined for variable-length encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct VarLong(pub u64);

impl VarLong {
    /// Writes the value to `buf`.
    pub fn write(self, buf: &mut impl BufMut) {
        write_var_u64(buf, self.0);
    }

    /// Reads a value from `buf`.
    pub fn read(buf: &mut impl Buf) -> Result<Self, ProtocolError> {
        read_var_u64(buf).map(Self)
    }

    /// Number of bytes [`VarLong::write`] will produce.
    pub fn written_len(self) -> usize {
        var_u64_len(self.0)
    }
}

impl From<u64> for VarLong {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for VarLong {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

/// Writes `value` as a VarInt.
pub fn write_var_u32(buf: &mut impl BufMut, mut value: u32) {
    while value >= u32::from(CONTINUE_BIT) {
        buf.put_u8((value as u8 & SEGMENT_BITS) | CONTINUE_BIT);
        value >>= 7;
    }
    buf.put_u8(value as u8);
}

/// Writes `value` as a VarLong.
pub fn write_var_u64(buf: &mut impl BufMut, mut value: u64) {
    while value >= u64::from(CONTINUE_BIT) {
        buf.put_u8((value as u8 & SEGMENT_BITS) | CONTINUE_BIT);
        value >>= 7;
    }
    buf.put_u8(value as u8);
}

/// Encoded size of `value` as a VarInt.
pub fn var_u32_len(value: u32) -> usize {
    let bits = 32 - value.leading_zeros() as usize;
    bits.div_ceil(7).max(1)
}

/// Encoded size of `value` as a VarLong.
pub fn var_u64_len(value: u64) -> usize {
    let bits = 64 - value.leading_zeros() as usize;
    bits.div_ceil(7).max(1)
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// Reads a VarInt.
///
/// # Errors
/// - `MalformedVarInt` if 5 bytes are consumed without a terminating byte.
/// - `TruncatedStream` if the buffer runs out mid-number.
pub fn read_var_u32(buf: &mut impl Buf) -> Result<u32, ProtocolError> {
    let mut value = 0u32;
    for index in 0..MAX_VARINT_LEN {
        let byte = next_byte(buf)?;
        // Bits shifted past the top of a u32 on the fifth byte are dropped.
        value |= u32::from(byte & SEGMENT_BITS) << (7 * index);
        if byte & CONTINUE_BIT == 0 {
            return Ok(value);
        }
    }
    Err(ProtocolError::MalformedVarInt {
        max_bytes: MAX_VARINT_LEN,
    })
}

/// Reads a VarLong.
///
/// # Errors
/// - `MalformedVarInt` if 10 bytes are consumed without a terminating byte.
/// - `TruncatedStream` if the buffer runs out mid-number.
pub fn read_var_u64(buf: &mut impl Buf) -> Result<u64, ProtocolError> {
    let mut value = 0u64;
    for index in 0..MAX_VARLONG_LEN {
        let byte = next_byte(buf)?;
        value |= u64::from(byte & SEGMENT_BITS) << (7 * index);
        if byte & CONTINUE_BIT == 0 {
            return Ok(value);
        }
    }
    Err(ProtocolError::MalformedVarInt {
        max_bytes: MAX_VARLONG_LEN,
    })
}

fn next_byte(buf: &mut impl Buf) -> Result<u8, ProtocolError> {
    if !buf.has_remaining() {
        return Err(ProtocolError::TruncatedStream {
            needed: 1,
            remaining: 0,
        });
    }
    Ok(buf.get_u8())
}

// ---------------------------------------------------------------------------
// Zig-zag
// ---------------------------------------------------------------------------

/// Maps a signed value onto an unsigned one so small magnitudes stay small:
/// `0 → 0, -1 → 1, 1 → 2, -2 → 3, ...`
pub fn zigzag_encode_32(value: i32) -> u32 {
    ((value << 1) ^ (value >> 31)) as u32
}

/// Inverse of [`zigzag_encode_32`].
pub fn zigzag_decode_32(value: u32) -> i32 {
    ((value >> 1) as i32) ^ -((value & 1) as i32)
}

/// 64-bit counterpart of [`zigzag_encode_32`].
pub fn zigzag_encode_64(value: i64) -> u64 {
    ((value << 1) ^ (value >> 63)) as u64
}

/// Inverse of [`zigzag_encode_64`].
pub fn zigzag_decode_64(value: u64) -> i64 {
    ((value >> 1) as i64) ^ -((value & 1) as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_u32(value: u32) -> Vec<u8> {
        let mut buf = Vec::new();
        write_var_u32(&mut buf, value);
        buf
    }

    // =====================================================================
    // Known encodings
    // =====================================================================

    #[test]
    fn test_var_u32_known_values() {
        let cases: [(u32, &[u8]); 9] = [
            (0, &[0x00]),
            (1, &[0x01]),
            (127, &[0x7f]),
            (128, &[0x80, 0x01]),
            (255, &[0xff, 0x01]),
            (300, &[0xac, 0x02]),
            (25565, &[0xdd, 0xc7, 0x01]),
            (2097151, &[0xff, 0xff, 0x7f]),
            (u32::MAX, &[0xff, 0xff, 0xff, 0xff, 0x0f]),
        ];

        for (value, expected) in cases {
            assert_eq!(encode_u32(value), expected, "encoding {value}");
            let mut slice = expected;
            assert_eq!(read_var_u32(&mut slice).unwrap(), value);
            assert!(slice.is_empty());
        }
    }

    #[test]
    fn test_var_u64_max_uses_ten_bytes() {
        let mut buf = Vec::new();
        write_var_u64(&mut buf, u64::MAX);
        assert_eq!(buf.len(), MAX_VARLONG_LEN);
        assert_eq!(*buf.last().unwrap(), 0x01);

        let mut slice = buf.as_slice();
        assert_eq!(read_var_u64(&mut slice).unwrap(), u64::MAX);
    }

    #[test]
    fn test_written_len_matches_encoding() {
        for value in [0, 1, 127, 128, 16383, 16384, u32::MAX] {
            assert_eq!(var_u32_len(value), encode_u32(value).len());
        }
        assert_eq!(var_u64_len(0), 1);
        assert_eq!(var_u64_len(u64::MAX), 10);
        assert_eq!(VarInt(300).written_len(), 2);
    }

    // =====================================================================
    // Boundaries
    // =====================================================================

    #[test]
    fn test_six_continuation_bytes_is_malformed() {
        let mut slice: &[u8] = &[0x80, 0x80, 0x80, 0x80, 0x80, 0x80];
        let err = read_var_u32(&mut slice).unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::MalformedVarInt { max_bytes: 5 }
        ));
    }

    #[test]
    fn test_five_bytes_with_terminator_succeeds() {
        let mut slice: &[u8] = &[0x80, 0x80, 0x80, 0x80, 0x08];
        assert_eq!(read_var_u32(&mut slice).unwrap(), 0x8000_0000);
    }

    #[test]
    fn test_eleven_continuation_bytes_is_malformed_varlong() {
        let bytes = [0xffu8; 11];
        let mut slice: &[u8] = &bytes;
        let err = read_var_u64(&mut slice).unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::MalformedVarInt { max_bytes: 10 }
        ));
    }

    #[test]
    fn test_truncated_varint() {
        let mut slice: &[u8] = &[0x80, 0x80];
        let err = read_var_u32(&mut slice).unwrap_err();
        assert!(matches!(err, ProtocolError::TruncatedStream { .. }));
    }

    #[test]
    fn test_empty_buffer_is_truncated() {
        let mut slice: &[u8] = &[];
        assert!(matches!(
            VarLong::read(&mut slice),
            Err(ProtocolError::TruncatedStream { needed: 1, remaining: 0 })
        ));
    }

    // =====================================================================
    // Zig-zag
    // =====================================================================

    #[test]
    fn test_zigzag_mapping() {
        assert_eq!(zigzag_encode_32(0), 0);
        assert_eq!(zigzag_encode_32(-1), 1);
        assert_eq!(zigzag_encode_32(1), 2);
        assert_eq!(zigzag_encode_32(-2), 3);
        assert_eq!(zigzag_encode_32(i32::MIN), u32::MAX);
        assert_eq!(zigzag_decode_32(u32::MAX), i32::MIN);
        assert_eq!(zigzag_decode_64(zigzag_encode_64(i64::MIN)), i64::MIN);
        assert_eq!(zigzag_decode_64(zigzag_encode_64(-42)), -42);
    }
}
