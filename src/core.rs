use crate::*;
use bytes::{Buf, BufMut};

/// Maximum number of bytes a 64-bit varint can occupy.
pub const MAX_VARINT_LEN64: usize = 10;

// --- Varint algorithms ---
/// Appends `v` as an unsigned LEB128 varint (7 bits per byte, high bit = continue).
pub fn encode_uvarint(writer: &mut BytesMut, mut v: u64) {
    while v >= 0x80 {
        writer.put_u8((v as u8) | 0x80);
        v >>= 7;
    }
    writer.put_u8(v as u8);
}

/// Appends `v` as a signed varint.
///
/// The sign is folded into the low bit (zig-zag), so small magnitudes of
/// either sign stay short: `0 -> 0x00`, `-1 -> 0x01`, `1 -> 0x02`, `5 -> 0x0A`.
pub fn encode_varint(writer: &mut BytesMut, v: i64) {
    let mut ux = (v as u64) << 1;
    if v < 0 {
        ux = !ux;
    }
    encode_uvarint(writer, ux);
}

/// Reads an unsigned varint from the front of `buf`.
///
/// Returns the value and the number of bytes it occupied.
///
/// # Errors
/// - `BufferTooSmall` if `buf` ends before a terminating byte.
/// - `VarintOverflow` if the value does not fit in 64 bits; `consumed` counts
///   the bytes up to and including the offending one.
pub fn read_uvarint(buf: &[u8]) -> Result<(u64, usize)> {
    let mut x: u64 = 0;
    let mut s: u32 = 0;
    for (i, &b) in buf.iter().enumerate() {
        if i == MAX_VARINT_LEN64 {
            return Err(EncoderError::VarintOverflow { consumed: i + 1 });
        }
        if b < 0x80 {
            if i == MAX_VARINT_LEN64 - 1 && b > 1 {
                return Err(EncoderError::VarintOverflow { consumed: i + 1 });
            }
            return Ok((x | (b as u64) << s, i + 1));
        }
        x |= ((b & 0x7f) as u64) << s;
        s += 7;
    }
    Err(EncoderError::BufferTooSmall)
}

/// Reads a signed (zig-zag) varint from the front of `buf`. See [`read_uvarint`].
pub fn read_varint(buf: &[u8]) -> Result<(i64, usize)> {
    let (ux, n) = read_uvarint(buf)?;
    let mut x = (ux >> 1) as i64;
    if ux & 1 != 0 {
        x = !x;
    }
    Ok((x, n))
}

/// Decodes an unsigned varint and advances `reader` past it.
///
/// On overflow the reader is still advanced past the bytes that belonged to
/// the broken varint, so a caller can skip them.
pub fn decode_uvarint(reader: &mut Bytes) -> Result<u64> {
    match read_uvarint(reader.chunk()) {
        Ok((v, n)) => {
            reader.advance(n);
            Ok(v)
        }
        Err(EncoderError::VarintOverflow { consumed }) => {
            reader.advance(consumed.min(reader.remaining()));
            Err(EncoderError::VarintOverflow { consumed })
        }
        Err(e) => Err(e),
    }
}

/// Decodes a signed varint and advances `reader` past it.
pub fn decode_varint(reader: &mut Bytes) -> Result<i64> {
    let ux = decode_uvarint(reader)?;
    let mut x = (ux >> 1) as i64;
    if ux & 1 != 0 {
        x = !x;
    }
    Ok(x)
}

/// Number of bytes `u` occupies as an unsigned varint.
pub fn uvarint_size(mut u: u64) -> usize {
    let mut n = 1;
    while u >= 0x80 {
        u >>= 7;
        n += 1;
    }
    n
}

/// Number of bytes `i` occupies as a signed varint.
pub fn varint_size(i: i64) -> usize {
    let mut ux = (i as u64) << 1;
    if i < 0 {
        ux = !ux;
    }
    uvarint_size(ux)
}

/// Number of bytes `bz` occupies once length-prefixed.
pub fn byte_slice_size(bz: &[u8]) -> usize {
    varint_size(bz.len() as i64) + bz.len()
}

// --- Byte strings ---
/// Appends a byte string: signed varint length, then the raw bytes.
pub fn encode_byte_slice(writer: &mut BytesMut, bz: &[u8]) {
    encode_varint(writer, bz.len() as i64);
    writer.put_slice(bz);
}

/// Decodes a length-prefixed byte string without copying it.
///
/// # Errors
/// Returns `InsufficientData` if the declared length is negative or larger than
/// what is left in `reader`.
pub fn decode_byte_slice(reader: &mut Bytes) -> Result<Bytes> {
    let len = decode_varint(reader)?;
    if len < 0 || len as u64 > reader.remaining() as u64 {
        return Err(EncoderError::InsufficientData);
    }
    Ok(reader.split_to(len as usize))
}

/// Decodes a sequence count.
///
/// Counts are signed on the wire but must not be negative.
pub fn decode_length(reader: &mut Bytes) -> Result<usize> {
    let len = decode_varint(reader)?;
    usize::try_from(len)
        .map_err(|_| EncoderError::Decode(format!("Negative sequence length: {}", len)))
}

// --- bool ---
/// Encodes a `bool` as a single byte: `0` for `false`, `1` for `true`.
impl Encoder for bool {
    fn encode(&self, writer: &mut BytesMut) -> Result<()> {
        writer.put_u8(u8::from(*self));
        Ok(())
    }
}
/// Decodes a `bool` from a single byte. Any non-zero byte is `true`.
impl Decoder for bool {
    fn decode(reader: &mut Bytes) -> Result<Self> {
        if reader.remaining() == 0 {
            return Err(EncoderError::InsufficientData);
        }
        Ok(reader.get_u8() != 0)
    }
}

// --- Fixed-width integers ---
impl Encoder for u8 {
    fn encode(&self, writer: &mut BytesMut) -> Result<()> {
        writer.put_u8(*self);
        Ok(())
    }
}
impl Decoder for u8 {
    fn decode(reader: &mut Bytes) -> Result<Self> {
        if reader.remaining() < 1 {
            return Err(EncoderError::InsufficientData);
        }
        Ok(reader.get_u8())
    }
}
impl Encoder for i8 {
    fn encode(&self, writer: &mut BytesMut) -> Result<()> {
        writer.put_i8(*self);
        Ok(())
    }
}
impl Decoder for i8 {
    fn decode(reader: &mut Bytes) -> Result<Self> {
        if reader.remaining() < 1 {
            return Err(EncoderError::InsufficientData);
        }
        Ok(reader.get_i8())
    }
}
/// 16-bit integers are always two little-endian bytes.
impl Encoder for u16 {
    fn encode(&self, writer: &mut BytesMut) -> Result<()> {
        writer.put_u16_le(*self);
        Ok(())
    }
}
impl Decoder for u16 {
    fn decode(reader: &mut Bytes) -> Result<Self> {
        if reader.remaining() < 2 {
            return Err(EncoderError::InsufficientData);
        }
        Ok(reader.get_u16_le())
    }
}
impl Encoder for i16 {
    fn encode(&self, writer: &mut BytesMut) -> Result<()> {
        writer.put_i16_le(*self);
        Ok(())
    }
}
impl Decoder for i16 {
    fn decode(reader: &mut Bytes) -> Result<Self> {
        if reader.remaining() < 2 {
            return Err(EncoderError::InsufficientData);
        }
        Ok(reader.get_i16_le())
    }
}

// --- Variable-width integers ---
/// 32 and 64-bit integers use varints: signed types the zig-zag form, unsigned
/// types plain LEB128. A 32-bit decode truncates like a cast.
impl Encoder for i32 {
    fn encode(&self, writer: &mut BytesMut) -> Result<()> {
        encode_varint(writer, *self as i64);
        Ok(())
    }
}
impl Decoder for i32 {
    fn decode(reader: &mut Bytes) -> Result<Self> {
        Ok(decode_varint(reader)? as i32)
    }
}
impl Encoder for i64 {
    fn encode(&self, writer: &mut BytesMut) -> Result<()> {
        encode_varint(writer, *self);
        Ok(())
    }
}
impl Decoder for i64 {
    fn decode(reader: &mut Bytes) -> Result<Self> {
        decode_varint(reader)
    }
}
impl Encoder for u32 {
    fn encode(&self, writer: &mut BytesMut) -> Result<()> {
        encode_uvarint(writer, *self as u64);
        Ok(())
    }
}
impl Decoder for u32 {
    fn decode(reader: &mut Bytes) -> Result<Self> {
        Ok(decode_uvarint(reader)? as u32)
    }
}
impl Encoder for u64 {
    fn encode(&self, writer: &mut BytesMut) -> Result<()> {
        encode_uvarint(writer, *self);
        Ok(())
    }
}
impl Decoder for u64 {
    fn decode(reader: &mut Bytes) -> Result<Self> {
        decode_uvarint(reader)
    }
}

// --- f32/f64 ---
/// Encodes an `f32` as 4 bytes (little-endian IEEE 754 bit pattern).
///
/// NaN payloads and the sign of zero are preserved.
impl Encoder for f32 {
    fn encode(&self, writer: &mut BytesMut) -> Result<()> {
        writer.put_u32_le(self.to_bits());
        Ok(())
    }
}
impl Decoder for f32 {
    fn decode(reader: &mut Bytes) -> Result<Self> {
        if reader.remaining() < 4 {
            return Err(EncoderError::InsufficientData);
        }
        Ok(f32::from_bits(reader.get_u32_le()))
    }
}
/// Encodes an `f64` as 8 bytes (little-endian IEEE 754 bit pattern).
impl Encoder for f64 {
    fn encode(&self, writer: &mut BytesMut) -> Result<()> {
        writer.put_u64_le(self.to_bits());
        Ok(())
    }
}
impl Decoder for f64 {
    fn decode(reader: &mut Bytes) -> Result<Self> {
        if reader.remaining() < 8 {
            return Err(EncoderError::InsufficientData);
        }
        Ok(f64::from_bits(reader.get_u64_le()))
    }
}

// --- Bytes ---
impl Encoder for Bytes {
    fn encode(&self, writer: &mut BytesMut) -> Result<()> {
        encode_byte_slice(writer, self);
        Ok(())
    }
}
impl Decoder for Bytes {
    fn decode(reader: &mut Bytes) -> Result<Self> {
        decode_byte_slice(reader)
    }
}

// --- String ---
/// Strings share the byte-string encoding.
impl Encoder for String {
    fn encode(&self, writer: &mut BytesMut) -> Result<()> {
        encode_byte_slice(writer, self.as_bytes());
        Ok(())
    }
}
impl Decoder for String {
    fn decode(reader: &mut Bytes) -> Result<Self> {
        let bz = decode_byte_slice(reader)?;
        String::from_utf8(bz.to_vec()).map_err(|e| EncoderError::Decode(e.to_string()))
    }
}

// --- Vec<T> ---
/// Encodes a sequence as a signed varint count followed by each element.
impl<T: Encoder> Encoder for Vec<T> {
    fn encode(&self, writer: &mut BytesMut) -> Result<()> {
        encode_varint(writer, self.len() as i64);
        for v in self {
            v.encode(writer)?;
        }
        Ok(())
    }
}
impl<T: Decoder> Decoder for Vec<T> {
    fn decode(reader: &mut Bytes) -> Result<Self> {
        let len = decode_length(reader)?;
        // every element takes at least one byte
        let mut vec = Vec::with_capacity(len.min(reader.remaining()));
        for _ in 0..len {
            vec.push(T::decode(reader)?);
        }
        Ok(vec)
    }
}

// --- Box<T> ---
/// Encodes a `Box<T>` by encoding the inner value.
impl<T: Encoder> Encoder for Box<T> {
    fn encode(&self, writer: &mut BytesMut) -> Result<()> {
        (**self).encode(writer)
    }
}
/// Decodes a `Box<T>` by decoding the inner value and wrapping it in a Box.
impl<T: Decoder> Decoder for Box<T> {
    fn decode(reader: &mut Bytes) -> Result<Self> {
        Ok(Box::new(T::decode(reader)?))
    }
}

/// Implementation for references - delegates to the referenced value
impl<T: Encoder> Encoder for &T {
    fn encode(&self, writer: &mut BytesMut) -> Result<()> {
        (*self).encode(writer)
    }
}

// --- DeepCopy ---
macro_rules! impl_deep_copy_by_value {
    ($($t:ty),+) => {
        $(
            impl DeepCopy for $t {
                #[inline]
                fn deep_copy(&self) -> Self {
                    *self
                }
            }
        )+
    };
}

impl_deep_copy_by_value!(bool, u8, i8, u16, i16, u32, i32, u64, i64, f32, f64);

/// Copies the bytes into a fresh allocation.
impl DeepCopy for Bytes {
    fn deep_copy(&self) -> Self {
        Bytes::copy_from_slice(self)
    }
}
impl DeepCopy for String {
    fn deep_copy(&self) -> Self {
        self.clone()
    }
}
impl<T: DeepCopy> DeepCopy for Vec<T> {
    fn deep_copy(&self) -> Self {
        self.iter().map(DeepCopy::deep_copy).collect()
    }
}
impl<T: DeepCopy> DeepCopy for Box<T> {
    fn deep_copy(&self) -> Self {
        Box::new((**self).deep_copy())
    }
}
impl<T: DeepCopy> DeepCopy for Option<T> {
    fn deep_copy(&self) -> Self {
        self.as_ref().map(DeepCopy::deep_copy)
    }
}
