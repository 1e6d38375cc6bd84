//! Top-level entry points: bare and length-prefixed envelopes.
//!
//! - Bare: magic bytes (4) + struct encoding.
//! - Length-prefixed: uvarint byte length of the bare form, then the bare form.

use crate::core::{encode_uvarint, read_uvarint, MAX_VARINT_LEN64};
use crate::registry::{Registered, TypeKind};
use crate::*;
use bytes::BufMut;
use std::io::{Read, Write};
use tracing::{debug, trace};

/// Encodes `value` with its magic bytes and no overall length.
pub fn marshal_binary_bare<T: Registered>(value: &T) -> Result<Bytes> {
    let mut writer = BytesMut::with_capacity(1024);
    writer.put_slice(&T::KIND.magic_bytes());
    value.encode(&mut writer)?;
    trace!("marshalled {} into {} bytes", T::KIND, writer.len());
    Ok(writer.freeze())
}

/// Encodes `value` bare and prepends the uvarint length of that encoding.
pub fn marshal_binary_length_prefixed<T: Registered>(value: &T) -> Result<Bytes> {
    let bare = marshal_binary_bare(value)?;
    let mut writer = BytesMut::with_capacity(MAX_VARINT_LEN64 + bare.len());
    encode_uvarint(&mut writer, bare.len() as u64);
    writer.put_slice(&bare);
    Ok(writer.freeze())
}

/// Writes the length-prefixed encoding of `value` to `w`.
///
/// Returns the number of bytes written.
pub fn marshal_binary_length_prefixed_writer<W: Write + ?Sized, T: Registered>(
    w: &mut W,
    value: &T,
) -> Result<usize> {
    let bz = marshal_binary_length_prefixed(value)?;
    w.write_all(&bz)?;
    Ok(bz.len())
}

/// Decodes a bare envelope holding a `T`.
///
/// Bytes after the value are ignored.
///
/// # Errors
/// - `BufferTooShort` if `bz` holds no more than the 4 tag bytes.
/// - `MagicBytesError::Mismatch` if the tag belongs to another registered type,
///   `MagicBytesError::Unknown` if it belongs to none.
/// - Any error from the struct decoder.
pub fn unmarshal_binary_bare<T: Registered>(bz: &[u8]) -> Result<T> {
    if bz.len() <= 4 {
        return Err(EncoderError::BufferTooShort(bz.len()));
    }
    let expected = T::KIND.magic_bytes();
    let found = [bz[0], bz[1], bz[2], bz[3]];
    if found != expected {
        debug!(
            "rejecting envelope for {}: magic bytes {:?}, expected {:?}",
            T::KIND,
            found,
            expected
        );
        let err = match TypeKind::from_magic_bytes(&found) {
            Some(_) => MagicBytesError::Mismatch { expected, found },
            None => MagicBytesError::Unknown { found },
        };
        return Err(err.into());
    }
    let mut reader = Bytes::copy_from_slice(&bz[4..]);
    T::decode(&mut reader)
}

/// Decodes a length-prefixed envelope holding a `T`.
///
/// The prefix must match the remaining length exactly.
///
/// # Errors
/// - `BufferTooShort(0)` for empty input.
/// - `InsufficientData` if the prefix declares more bytes than follow it.
/// - `TrailingBytes` if it declares fewer.
pub fn unmarshal_binary_length_prefixed<T: Registered>(bz: &[u8]) -> Result<T> {
    if bz.is_empty() {
        return Err(EncoderError::BufferTooShort(0));
    }
    let (declared, n) = read_uvarint(bz)?;
    let remaining = bz.len() - n;
    if declared > remaining as u64 {
        debug!(
            "length prefix wants {} more bytes but only {} remain",
            declared, remaining
        );
        return Err(EncoderError::InsufficientData);
    }
    if declared < remaining as u64 {
        debug!(
            "length prefix declares {} bytes but {} remain",
            declared, remaining
        );
        return Err(EncoderError::TrailingBytes {
            declared,
            remaining,
        });
    }
    unmarshal_binary_bare(&bz[n..])
}

/// Reads one length-prefixed envelope from `reader`.
///
/// The prefix is read a byte at a time so nothing past the envelope is
/// consumed. `max_size` caps prefix plus payload; `0` means no cap. Returns
/// the value and the total number of bytes read.
///
/// # Errors
/// - `SizeLimitExceeded` as soon as the prefix or the declared length shows
///   the envelope cannot fit in `max_size`. Nothing is allocated for the payload
///   in that case.
/// - `Io` for read failures, including an early end of stream.
pub fn unmarshal_binary_length_prefixed_reader<R: Read, T: Registered>(
    reader: &mut R,
    max_size: u64,
) -> Result<(T, u64)> {
    let mut prefix = [0u8; MAX_VARINT_LEN64];
    let mut n: usize = 0;
    loop {
        if n == MAX_VARINT_LEN64 {
            return Err(EncoderError::VarintOverflow { consumed: n });
        }
        reader.read_exact(&mut prefix[n..n + 1])?;
        n += 1;
        if prefix[n - 1] & 0x80 == 0 {
            break;
        }
        if max_size > 0 && n as u64 >= max_size {
            debug!("length prefix alone reaches max size {}", max_size);
            return Err(EncoderError::SizeLimitExceeded {
                max_size,
                size: n as u64 + 1,
            });
        }
    }
    let (declared, _) = read_uvarint(&prefix[..n])?;
    let total = (n as u64).saturating_add(declared);
    if max_size > 0 && total > max_size {
        debug!(
            "envelope of {}+{} bytes exceeds max size {}",
            n, declared, max_size
        );
        return Err(EncoderError::SizeLimitExceeded {
            max_size,
            size: total,
        });
    }

    let mut bz = Vec::new();
    reader.by_ref().take(declared).read_to_end(&mut bz)?;
    if (bz.len() as u64) < declared {
        return Err(std::io::Error::from(std::io::ErrorKind::UnexpectedEof).into());
    }
    let value = unmarshal_binary_bare(&bz)?;
    Ok((value, total))
}

/// Like [`marshal_binary_bare`], panicking on failure.
pub fn must_marshal_binary_bare<T: Registered>(value: &T) -> Bytes {
    marshal_binary_bare(value).unwrap_or_else(|e| panic!("{}", e))
}

/// Like [`marshal_binary_length_prefixed`], panicking on failure.
pub fn must_marshal_binary_length_prefixed<T: Registered>(value: &T) -> Bytes {
    marshal_binary_length_prefixed(value).unwrap_or_else(|e| panic!("{}", e))
}

/// Like [`unmarshal_binary_bare`], panicking on failure.
pub fn must_unmarshal_binary_bare<T: Registered>(bz: &[u8]) -> T {
    unmarshal_binary_bare(bz).unwrap_or_else(|e| panic!("{}", e))
}

/// Like [`unmarshal_binary_length_prefixed`], panicking on failure.
pub fn must_unmarshal_binary_length_prefixed<T: Registered>(bz: &[u8]) -> T {
    unmarshal_binary_length_prefixed(bz).unwrap_or_else(|e| panic!("{}", e))
}
