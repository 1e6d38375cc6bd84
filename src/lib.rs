//! # iavl-proof-codec
//!
//! A deterministic, compact binary codec for IAVL Merkle range proofs and the
//! proof operators that carry them.
//!
//! - Varint based primitives, byte-compatible with the common `Varint` / `Uvarint` codecs
//! - Per-type encode, decode, deep copy and random generation for the six proof types
//! - A closed registry of 4-byte magic tags for self-describing top-level values
//! - Bare and length-prefixed framing, including a size-capped streaming reader
//!
//! ## Wire format
//!
//! A top-level value is written as its 4-byte magic tag followed by its fields in
//! declaration order. The length-prefixed form prepends the uvarint byte length of
//! that bare payload.
//!
//! ```rust
//! use bytes::Bytes;
//! use iavl_proof_codec::{
//!     marshal_binary_length_prefixed, unmarshal_binary_length_prefixed, ProofLeafNode,
//! };
//!
//! let leaf = ProofLeafNode {
//!     key: Bytes::from_static(b"ab"),
//!     value_hash: Bytes::from_static(b"cd"),
//!     version: 5,
//! };
//! let bz = marshal_binary_length_prefixed(&leaf).unwrap();
//! let decoded: ProofLeafNode = unmarshal_binary_length_prefixed(&bz).unwrap();
//! assert_eq!(leaf, decoded);
//! ```
//!
//! ## Feature Flags
//!
//! - `rand` (default): implements [`RandSrc`] for every `rand::RngCore`, so any
//!   seeded generator can drive [`Random`] for property tests.

pub mod codec;
pub mod core;
pub mod framing;
pub mod op;
pub mod proof;
pub mod random;
pub mod registry;

use bytes::{Bytes, BytesMut};

pub use crate::codec::{Codec, CodecBuilder};
pub use crate::framing::{
    marshal_binary_bare, marshal_binary_length_prefixed, marshal_binary_length_prefixed_writer,
    must_marshal_binary_bare, must_marshal_binary_length_prefixed, must_unmarshal_binary_bare,
    must_unmarshal_binary_length_prefixed, unmarshal_binary_bare, unmarshal_binary_length_prefixed,
    unmarshal_binary_length_prefixed_reader,
};
pub use crate::op::{
    IavlAbsenceOp, IavlValueOp, OpError, ProofOp, ProofOperator, RangeProofVerifier,
    PROOF_OP_IAVL_ABSENCE, PROOF_OP_IAVL_VALUE,
};
pub use crate::proof::{PathToLeaf, ProofInnerNode, ProofLeafNode, RangeProof};
pub use crate::random::{RandSrc, Random, MAX_SLICE_LENGTH, MAX_STRING_LENGTH};
pub use crate::registry::{
    decode_any, deep_copy_any, encode_any, magic_bytes_of, random_any, support_list, AnyValue,
    Registered, TypeKind, MAGIC_BYTES,
};

/// Errors that can occur during encoding or decoding operations.
#[derive(Debug, thiserror::Error)]
pub enum EncoderError {
    /// The value could not be encoded.
    #[error("Encode error: {0}")]
    Encode(String),
    /// The bytes were well framed but describe an invalid value.
    #[error("Decode error: {0}")]
    Decode(String),
    /// The buffer did not contain enough data to complete the operation.
    #[error("Insufficient data in buffer")]
    InsufficientData,
    /// A varint ran off the end of the buffer without a terminating byte.
    #[error("Buffer too small to hold a varint")]
    BufferTooSmall,
    /// A varint does not fit in 64 bits. `consumed` bytes belong to it.
    #[error("Varint overflows 64 bits after {consumed} bytes")]
    VarintOverflow { consumed: usize },
    /// A tagged envelope must hold a tag and at least one payload byte.
    #[error("Byte slice is too short: {0}")]
    BufferTooShort(usize),
    /// A length prefix declared fewer bytes than the buffer holds.
    #[error("Bytes left over after length-prefixed value: declared {declared} but {remaining} remain")]
    TrailingBytes { declared: u64, remaining: usize },
    /// A streaming read would go past the caller's size cap.
    #[error("Read overflow: max size is {max_size} but the value needs {size} bytes")]
    SizeLimitExceeded { max_size: u64, size: u64 },
    /// Magic tag errors
    #[error(transparent)]
    MagicBytes(#[from] MagicBytesError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// The result type used throughout this crate for encode/decode operations.
pub type Result<T> = std::result::Result<T, EncoderError>;

/// Errors raised while checking the 4-byte type tag of an envelope.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MagicBytesError {
    #[error("Unknown magic bytes {found:?}")]
    Unknown { found: [u8; 4] },
    #[error("Magic bytes mismatch: expected {expected:?}, got {found:?}")]
    Mismatch { expected: [u8; 4], found: [u8; 4] },
}

/// Trait for types that can be encoded into the proof wire format.
///
/// Fields are written in declaration order with no field IDs or type tags.
pub trait Encoder {
    /// Append the encoding of `self` to `writer`.
    fn encode(&self, writer: &mut BytesMut) -> Result<()>;
}

/// Trait for types that can be decoded from the proof wire format.
///
/// Decoding advances `reader` past every byte it consumed. When an error is
/// returned the reader has still been advanced past the fields read before the
/// failure, and the partially decoded value is dropped.
pub trait Decoder: Sized {
    fn decode(reader: &mut Bytes) -> Result<Self>;
}

/// Trait for values that can be duplicated without sharing any backing storage.
///
/// `Clone` on [`Bytes`] only bumps a reference count; `deep_copy` allocates.
pub trait DeepCopy {
    fn deep_copy(&self) -> Self;
}

/// Convenience function to encode a value to bytes.
///
/// # Example
/// ```rust
/// use iavl_proof_codec::{encode, ProofLeafNode};
/// use bytes::Bytes;
///
/// let leaf = ProofLeafNode {
///     key: Bytes::from_static(b"ab"),
///     value_hash: Bytes::from_static(b"cd"),
///     version: 5,
/// };
/// let bz = encode(&leaf).unwrap();
/// assert_eq!(&bz[..], &[0x04, b'a', b'b', 0x04, b'c', b'd', 0x0A]);
/// ```
pub fn encode<T: Encoder>(value: &T) -> Result<Bytes> {
    let mut writer = BytesMut::new();
    value.encode(&mut writer)?;
    Ok(writer.freeze())
}

/// Convenience function to decode a value from bytes.
///
/// This is equivalent to calling `T::decode(reader)`.
pub fn decode<T: Decoder>(reader: &mut Bytes) -> Result<T> {
    T::decode(reader)
}

/// Decodes a value from the front of `bz` and reports how many bytes it used.
pub fn decode_from_slice<T: Decoder>(bz: &[u8]) -> Result<(T, usize)> {
    let mut reader = Bytes::copy_from_slice(bz);
    let value = T::decode(&mut reader)?;
    Ok((value, bz.len() - reader.len()))
}
