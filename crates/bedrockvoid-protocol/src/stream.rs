//! Encoding and decoding streams.
//!
//! Packet codecs only ever see an [`EncodingStream`] or a
//! [`DecodingStream`]. The streams expose the protocol's primitives
//! (fixed-width numbers in both byte orders, var ints, two string
//! encodings, three array count widths, raw bytes) and keep the buffer
//! type private, so a codec cannot reach around them.
//!
//! The protocol mixes byte orders between packets, so each fixed-width
//! primitive has a big-endian method and a separate `_le` method. Nothing
//! is inferred: the packet codec picks the one its layout calls for.
//!
//! Streams are created per packet and dropped afterwards. They are
//! forward-only and never shared between threads.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use serde::{Serialize, de::DeserializeOwned};

use crate::codec::{Codec, JsonCodec};
use crate::varint::{read_var_u32, read_var_u64, write_var_u32, write_var_u64};
use crate::ProtocolError;

// ===========================================================================
// EncodingStream
// ===========================================================================

/// Appends primitives to an outbound buffer.
pub struct EncodingStream<'a, C: Codec = JsonCodec> {
    buf: &'a mut BytesMut,
    codec: &'a C,
}

impl<'a, C: Codec> EncodingStream<'a, C> {
    /// Creates a stream that appends to `buf`.
    pub fn new(buf: &'a mut BytesMut, codec: &'a C) -> Self {
        Self { buf, codec }
    }

    /// The JSON codec lent to this stream.
    pub fn codec(&self) -> &'a C {
        self.codec
    }

    /// Number of bytes in the underlying buffer.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// `true` if nothing has been written to the underlying buffer.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    // -- Scalars ------------------------------------------------------------

    pub fn encode_bool(&mut self, value: bool) {
        self.buf.put_u8(u8::from(value));
    }

    pub fn encode_byte(&mut self, value: u8) {
        self.buf.put_u8(value);
    }

    pub fn encode_short(&mut self, value: i16) {
        self.buf.put_i16(value);
    }

    pub fn encode_short_le(&mut self, value: i16) {
        self.buf.put_i16_le(value);
    }

    pub fn encode_int(&mut self, value: i32) {
        self.buf.put_i32(value);
    }

    pub fn encode_int_le(&mut self, value: i32) {
        self.buf.put_i32_le(value);
    }

    pub fn encode_long(&mut self, value: i64) {
        self.buf.put_i64(value);
    }

    pub fn encode_long_le(&mut self, value: i64) {
        self.buf.put_i64_le(value);
    }

    pub fn encode_float(&mut self, value: f32) {
        self.buf.put_f32(value);
    }

    pub fn encode_float_le(&mut self, value: f32) {
        self.buf.put_f32_le(value);
    }

    pub fn encode_double(&mut self, value: f64) {
        self.buf.put_f64(value);
    }

    pub fn encode_double_le(&mut self, value: f64) {
        self.buf.put_f64_le(value);
    }

    pub fn encode_var_uint(&mut self, value: u32) {
        write_var_u32(self.buf, value);
    }

    pub fn encode_var_ulong(&mut self, value: u64) {
        write_var_u64(self.buf, value);
    }

    // -- Strings and bytes --------------------------------------------------

    /// Writes a var-uint byte length followed by the UTF-8 bytes.
    pub fn encode_string(&mut self, value: &str) -> Result<(), ProtocolError> {
        let len = width::<u32>(value.len(), "string")?;
        self.encode_var_uint(len);
        self.encode_bytes(value.as_bytes());
        Ok(())
    }

    /// Writes a 4-byte little-endian byte length followed by the UTF-8
    /// bytes.
    pub fn encode_string_le(&mut self, value: &str) -> Result<(), ProtocolError> {
        let len = width::<u32>(value.len(), "string")?;
        self.buf.put_u32_le(len);
        self.encode_bytes(value.as_bytes());
        Ok(())
    }

    /// Copies `bytes` verbatim, with no length prefix.
    pub fn encode_bytes(&mut self, bytes: &[u8]) {
        self.buf.put_slice(bytes);
    }

    /// Serializes `value` with the stream's codec and writes it as a
    /// 4-byte little-endian length-prefixed string.
    pub fn encode_json_le<T: Serialize>(&mut self, value: &T) -> Result<(), ProtocolError> {
        let json = self.codec.encode(value)?;
        let len = width::<u32>(json.len(), "json document")?;
        self.buf.put_u32_le(len);
        self.encode_bytes(&json);
        Ok(())
    }

    // -- Arrays ---------------------------------------------------------------

    /// Writes a var-uint element count, then each element with `encode`.
    pub fn encode_array<T, F>(&mut self, items: &[T], mut encode: F) -> Result<(), ProtocolError>
    where
        F: FnMut(&mut Self, &T) -> Result<(), ProtocolError>,
    {
        let count = width::<u32>(items.len(), "array")?;
        self.encode_var_uint(count);
        items.iter().try_for_each(|item| encode(self, item))
    }

    /// Writes a 2-byte little-endian element count, then each element.
    pub fn encode_array_short_le<T, F>(
        &mut self,
        items: &[T],
        mut encode: F,
    ) -> Result<(), ProtocolError>
    where
        F: FnMut(&mut Self, &T) -> Result<(), ProtocolError>,
    {
        let count = width::<u16>(items.len(), "array")?;
        self.buf.put_u16_le(count);
        items.iter().try_for_each(|item| encode(self, item))
    }

    /// Writes a 4-byte little-endian element count, then each element.
    pub fn encode_array_int_le<T, F>(
        &mut self,
        items: &[T],
        mut encode: F,
    ) -> Result<(), ProtocolError>
    where
        F: FnMut(&mut Self, &T) -> Result<(), ProtocolError>,
    {
        let count = width::<u32>(items.len(), "array")?;
        self.buf.put_u32_le(count);
        items.iter().try_for_each(|item| encode(self, item))
    }
}

/// Narrows a length to the width of its prefix field.
fn width<W: TryFrom<usize>>(len: usize, what: &str) -> Result<W, ProtocolError> {
    W::try_from(len).map_err(|_| {
        ProtocolError::InvalidMessage(format!(
            "{what} length {len} does not fit its length prefix"
        ))
    })
}

// ===========================================================================
// DecodingStream
// ===========================================================================

/// Reads primitives from an inbound buffer.
///
/// Every read checks the remaining length first and fails with
/// `TruncatedStream` instead of panicking.
pub struct DecodingStream<'a, C: Codec = JsonCodec> {
    buf: Bytes,
    codec: &'a C,
}

impl<'a, C: Codec> DecodingStream<'a, C> {
    /// Creates a stream reading `buf` from its start.
    pub fn new(buf: Bytes, codec: &'a C) -> Self {
        Self { buf, codec }
    }

    /// The JSON codec lent to this stream.
    pub fn codec(&self) -> &'a C {
        self.codec
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    /// `true` once every byte has been consumed.
    pub fn is_exhausted(&self) -> bool {
        !self.buf.has_remaining()
    }

    fn ensure(&self, needed: usize) -> Result<(), ProtocolError> {
        let remaining = self.buf.remaining();
        if needed > remaining {
            return Err(ProtocolError::TruncatedStream { needed, remaining });
        }
        Ok(())
    }

    // -- Scalars ------------------------------------------------------------

    /// Reads one byte; any non-zero value is `true`.
    pub fn decode_bool(&mut self) -> Result<bool, ProtocolError> {
        Ok(self.decode_byte()? != 0)
    }

    pub fn decode_byte(&mut self) -> Result<u8, ProtocolError> {
        self.ensure(1)?;
        Ok(self.buf.get_u8())
    }

    pub fn decode_short(&mut self) -> Result<i16, ProtocolError> {
        self.ensure(2)?;
        Ok(self.buf.get_i16())
    }

    pub fn decode_short_le(&mut self) -> Result<i16, ProtocolError> {
        self.ensure(2)?;
        Ok(self.buf.get_i16_le())
    }

    pub fn decode_int(&mut self) -> Result<i32, ProtocolError> {
        self.ensure(4)?;
        Ok(self.buf.get_i32())
    }

    pub fn decode_int_le(&mut self) -> Result<i32, ProtocolError> {
        self.ensure(4)?;
        Ok(self.buf.get_i32_le())
    }

    pub fn decode_long(&mut self) -> Result<i64, ProtocolError> {
        self.ensure(8)?;
        Ok(self.buf.get_i64())
    }

    pub fn decode_long_le(&mut self) -> Result<i64, ProtocolError> {
        self.ensure(8)?;
        Ok(self.buf.get_i64_le())
    }

    pub fn decode_float(&mut self) -> Result<f32, ProtocolError> {
        self.ensure(4)?;
        Ok(self.buf.get_f32())
    }

    pub fn decode_float_le(&mut self) -> Result<f32, ProtocolError> {
        self.ensure(4)?;
        Ok(self.buf.get_f32_le())
    }

    pub fn decode_double(&mut self) -> Result<f64, ProtocolError> {
        self.ensure(8)?;
        Ok(self.buf.get_f64())
    }

    pub fn decode_double_le(&mut self) -> Result<f64, ProtocolError> {
        self.ensure(8)?;
        Ok(self.buf.get_f64_le())
    }

    pub fn decode_var_uint(&mut self) -> Result<u32, ProtocolError> {
        read_var_u32(&mut self.buf)
    }

    pub fn decode_var_ulong(&mut self) -> Result<u64, ProtocolError> {
        read_var_u64(&mut self.buf)
    }

    // -- Strings and bytes --------------------------------------------------

    /// Reads a var-uint byte length followed by that many UTF-8 bytes.
    pub fn decode_string(&mut self) -> Result<String, ProtocolError> {
        let len = self.decode_var_uint()? as usize;
        self.decode_utf8(len)
    }

    /// Reads a 4-byte little-endian byte length followed by that many
    /// UTF-8 bytes.
    pub fn decode_string_le(&mut self) -> Result<String, ProtocolError> {
        let len = self.decode_u32_le()? as usize;
        self.decode_utf8(len)
    }

    fn decode_utf8(&mut self, len: usize) -> Result<String, ProtocolError> {
        let bytes = self.decode_bytes(len)?;
        Ok(std::str::from_utf8(&bytes)?.to_owned())
    }

    fn decode_u32_le(&mut self) -> Result<u32, ProtocolError> {
        self.ensure(4)?;
        Ok(self.buf.get_u32_le())
    }

    /// Takes the next `len` bytes without copying.
    pub fn decode_bytes(&mut self, len: usize) -> Result<Bytes, ProtocolError> {
        self.ensure(len)?;
        Ok(self.buf.split_to(len))
    }

    /// Carves the next `len` bytes into a stream of their own.
    ///
    /// The parent stream skips past them. Used for nested blocks such as
    /// the login token section, which has its own internal layout.
    pub fn decode_slice(&mut self, len: usize) -> Result<DecodingStream<'a, C>, ProtocolError> {
        let bytes = self.decode_bytes(len)?;
        Ok(DecodingStream::new(bytes, self.codec))
    }

    /// Reads a 4-byte little-endian length-prefixed document and parses
    /// it with the stream's codec.
    pub fn decode_json_le<T: DeserializeOwned>(&mut self) -> Result<T, ProtocolError> {
        let len = self.decode_u32_le()? as usize;
        let bytes = self.decode_bytes(len)?;
        self.codec.decode(&bytes)
    }

    // -- Arrays ---------------------------------------------------------------

    /// Reads a var-uint element count, then each element with `decode`.
    pub fn decode_array<T, F>(&mut self, decode: F) -> Result<Vec<T>, ProtocolError>
    where
        F: FnMut(&mut Self) -> Result<T, ProtocolError>,
    {
        let count = self.decode_var_uint()? as usize;
        self.decode_elements(count, decode)
    }

    /// Reads a 2-byte little-endian element count, then each element.
    pub fn decode_array_short_le<T, F>(&mut self, decode: F) -> Result<Vec<T>, ProtocolError>
    where
        F: FnMut(&mut Self) -> Result<T, ProtocolError>,
    {
        self.ensure(2)?;
        let count = usize::from(self.buf.get_u16_le());
        self.decode_elements(count, decode)
    }

    /// Reads a 4-byte little-endian element count, then each element.
    pub fn decode_array_int_le<T, F>(&mut self, decode: F) -> Result<Vec<T>, ProtocolError>
    where
        F: FnMut(&mut Self) -> Result<T, ProtocolError>,
    {
        let count = self.decode_u32_le()? as usize;
        self.decode_elements(count, decode)
    }

    // Elements take at least one byte each, so a count above the
    // remaining length can never be satisfied.
    fn decode_elements<T, F>(
        &mut self,
        count: usize,
        mut decode: F,
    ) -> Result<Vec<T>, ProtocolError>
    where
        F: FnMut(&mut Self) -> Result<T, ProtocolError>,
    {
        self.ensure(count)?;
        let mut items = Vec::with_capacity(count);
        for _ in 0..count {
            items.push(decode(self)?);
        }
        Ok(items)
    }
}
