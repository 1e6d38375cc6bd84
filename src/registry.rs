//! The closed set of top-level types and their 4-byte magic tags.
//!
//! A tagged envelope is the magic bytes of the value's type followed by its
//! struct encoding. The table is fixed; other implementations match on the
//! exact bytes.

use crate::op::{IavlAbsenceOp, IavlValueOp};
use crate::proof::{PathToLeaf, ProofInnerNode, ProofLeafNode, RangeProof};
use crate::random::{RandSrc, Random};
use crate::*;
use bytes::{Buf, BufMut};

/// Magic bytes indexed by `TypeKind as usize`.
pub const MAGIC_BYTES: [[u8; 4]; 6] = [
    [207, 81, 179, 157],
    [126, 47, 172, 221],
    [96, 9, 168, 214],
    [117, 169, 83, 140],
    [152, 49, 245, 98],
    [67, 7, 76, 59],
];

const fn magic_bytes_are_unique(table: &[[u8; 4]]) -> bool {
    let mut i = 0;
    while i < table.len() {
        let mut j = i + 1;
        while j < table.len() {
            let (a, b) = (table[i], table[j]);
            if a[0] == b[0] && a[1] == b[1] && a[2] == b[2] && a[3] == b[3] {
                return false;
            }
            j += 1;
        }
        i += 1;
    }
    true
}

const _: () = assert!(
    magic_bytes_are_unique(&MAGIC_BYTES),
    "two registered types share magic bytes"
);

/// Discriminant of a registered type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum TypeKind {
    IavlAbsenceOp = 0,
    IavlValueOp = 1,
    PathToLeaf = 2,
    ProofInnerNode = 3,
    ProofLeafNode = 4,
    RangeProof = 5,
}

impl TypeKind {
    pub const ALL: [TypeKind; 6] = [
        TypeKind::IavlAbsenceOp,
        TypeKind::IavlValueOp,
        TypeKind::PathToLeaf,
        TypeKind::ProofInnerNode,
        TypeKind::ProofLeafNode,
        TypeKind::RangeProof,
    ];

    pub const fn magic_bytes(self) -> [u8; 4] {
        MAGIC_BYTES[self as usize]
    }

    pub fn from_magic_bytes(magic: &[u8; 4]) -> Option<TypeKind> {
        TypeKind::ALL
            .into_iter()
            .find(|kind| kind.magic_bytes() == *magic)
    }

    /// Short alias, as used when registering the type with a codec.
    pub const fn name(self) -> &'static str {
        match self {
            TypeKind::IavlAbsenceOp => "IAVLAbsenceOp",
            TypeKind::IavlValueOp => "IAVLValueOp",
            TypeKind::PathToLeaf => "PathToLeaf",
            TypeKind::ProofInnerNode => "ProofInnerNode",
            TypeKind::ProofLeafNode => "ProofLeafNode",
            TypeKind::RangeProof => "RangeProof",
        }
    }

    /// Fully qualified Rust path of the type. Debug output only.
    pub const fn type_path(self) -> &'static str {
        match self {
            TypeKind::IavlAbsenceOp => concat!(env!("CARGO_CRATE_NAME"), "::IavlAbsenceOp"),
            TypeKind::IavlValueOp => concat!(env!("CARGO_CRATE_NAME"), "::IavlValueOp"),
            TypeKind::PathToLeaf => concat!(env!("CARGO_CRATE_NAME"), "::PathToLeaf"),
            TypeKind::ProofInnerNode => concat!(env!("CARGO_CRATE_NAME"), "::ProofInnerNode"),
            TypeKind::ProofLeafNode => concat!(env!("CARGO_CRATE_NAME"), "::ProofLeafNode"),
            TypeKind::RangeProof => concat!(env!("CARGO_CRATE_NAME"), "::RangeProof"),
        }
    }
}

impl std::fmt::Display for TypeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Implemented by exactly the six types that can travel in a tagged envelope.
///
/// Typed marshal/unmarshal entry points are bounded on this trait, so passing
/// any other type is a compile error rather than a runtime failure.
pub trait Registered: Encoder + Decoder + DeepCopy + Random + Into<AnyValue> {
    const KIND: TypeKind;
}

/// Magic bytes of a registered type.
pub fn magic_bytes_of<T: Registered>() -> [u8; 4] {
    T::KIND.magic_bytes()
}

/// A value of any registered type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnyValue {
    IavlAbsenceOp(IavlAbsenceOp),
    IavlValueOp(IavlValueOp),
    PathToLeaf(PathToLeaf),
    ProofInnerNode(ProofInnerNode),
    ProofLeafNode(ProofLeafNode),
    RangeProof(RangeProof),
}

macro_rules! impl_registered {
    ($($t:ident),+ $(,)?) => {
        $(
            impl Registered for $t {
                const KIND: TypeKind = TypeKind::$t;
            }

            impl From<$t> for AnyValue {
                fn from(value: $t) -> Self {
                    AnyValue::$t(value)
                }
            }

            impl TryFrom<AnyValue> for $t {
                type Error = AnyValue;

                fn try_from(value: AnyValue) -> std::result::Result<Self, AnyValue> {
                    match value {
                        AnyValue::$t(v) => Ok(v),
                        other => Err(other),
                    }
                }
            }
        )+

        impl AnyValue {
            pub fn kind(&self) -> TypeKind {
                match self {
                    $(AnyValue::$t(_) => TypeKind::$t,)+
                }
            }

            fn encode_payload(&self, writer: &mut BytesMut) -> Result<()> {
                match self {
                    $(AnyValue::$t(v) => v.encode(writer),)+
                }
            }

            fn decode_payload(kind: TypeKind, reader: &mut Bytes) -> Result<Self> {
                match kind {
                    $(TypeKind::$t => Ok(AnyValue::$t($t::decode(reader)?)),)+
                }
            }

            fn random_of<R: RandSrc + ?Sized>(kind: TypeKind, r: &mut R) -> Self {
                match kind {
                    $(TypeKind::$t => AnyValue::$t($t::random(r)),)+
                }
            }
        }

        impl DeepCopy for AnyValue {
            fn deep_copy(&self) -> Self {
                match self {
                    $(AnyValue::$t(v) => AnyValue::$t(v.deep_copy()),)+
                }
            }
        }
    };
}

impl_registered!(
    IavlAbsenceOp,
    IavlValueOp,
    PathToLeaf,
    ProofInnerNode,
    ProofLeafNode,
    RangeProof,
);

impl AnyValue {
    pub fn magic_bytes(&self) -> [u8; 4] {
        self.kind().magic_bytes()
    }
}

/// Writes the value's magic bytes, then its struct encoding.
pub fn encode_any(value: &AnyValue, writer: &mut BytesMut) -> Result<()> {
    writer.put_slice(&value.magic_bytes());
    value.encode_payload(writer)
}

/// Reads a magic tag and decodes the matching type.
///
/// # Errors
/// - `InsufficientData` if fewer than 4 bytes are available.
/// - `MagicBytesError::Unknown` if the tag is not in the table; the reader is
///   left untouched in that case.
pub fn decode_any(reader: &mut Bytes) -> Result<AnyValue> {
    if reader.remaining() < 4 {
        return Err(EncoderError::InsufficientData);
    }
    let magic = [reader[0], reader[1], reader[2], reader[3]];
    let kind =
        TypeKind::from_magic_bytes(&magic).ok_or(MagicBytesError::Unknown { found: magic })?;
    reader.advance(4);
    AnyValue::decode_payload(kind, reader)
}

/// Deep copies a value of any registered type.
pub fn deep_copy_any(value: &AnyValue) -> AnyValue {
    value.deep_copy()
}

/// Generates a random value of a randomly chosen registered type.
pub fn random_any<R: RandSrc + ?Sized>(r: &mut R) -> AnyValue {
    let kind = TypeKind::ALL[(r.get_uint() % TypeKind::ALL.len() as u64) as usize];
    AnyValue::random_of(kind, r)
}

/// Fully qualified paths of every registered type, sorted.
pub fn support_list() -> Vec<&'static str> {
    let mut list: Vec<_> = TypeKind::ALL.iter().map(|kind| kind.type_path()).collect();
    list.sort_unstable();
    list
}

impl Encoder for AnyValue {
    fn encode(&self, writer: &mut BytesMut) -> Result<()> {
        encode_any(self, writer)
    }
}

impl Decoder for AnyValue {
    fn decode(reader: &mut Bytes) -> Result<Self> {
        decode_any(reader)
    }
}

impl Random for AnyValue {
    fn random<R: RandSrc + ?Sized>(r: &mut R) -> Self {
        random_any(r)
    }
}
