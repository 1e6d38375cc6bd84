//! IAVL proof data types and their struct codecs.
//!
//! Fields are written in declaration order. Sequences carry a signed varint
//! count before their elements, once per nesting level. Nothing here computes
//! or checks hashes; that belongs to the tree library that builds the proofs.

use crate::core::{decode_byte_slice, encode_byte_slice, encode_varint};
use crate::random::{RandSrc, Random};
use crate::*;
use std::ops::{Deref, DerefMut};

/// One inner node on a proof path.
///
/// Exactly one of `left` / `right` holds the sibling hash at this level; the
/// other side is the path being proved and is left empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ProofInnerNode {
    pub height: i8,
    pub size: i64,
    pub version: i64,
    pub left: Bytes,
    pub right: Bytes,
}

impl Encoder for ProofInnerNode {
    fn encode(&self, writer: &mut BytesMut) -> Result<()> {
        self.height.encode(writer)?;
        encode_varint(writer, self.size);
        encode_varint(writer, self.version);
        encode_byte_slice(writer, &self.left);
        encode_byte_slice(writer, &self.right);
        Ok(())
    }
}

impl Decoder for ProofInnerNode {
    fn decode(reader: &mut Bytes) -> Result<Self> {
        Ok(ProofInnerNode {
            height: i8::decode(reader)?,
            size: i64::decode(reader)?,
            version: i64::decode(reader)?,
            left: decode_byte_slice(reader)?,
            right: decode_byte_slice(reader)?,
        })
    }
}

impl DeepCopy for ProofInnerNode {
    fn deep_copy(&self) -> Self {
        ProofInnerNode {
            height: self.height,
            size: self.size,
            version: self.version,
            left: self.left.deep_copy(),
            right: self.right.deep_copy(),
        }
    }
}

impl Random for ProofInnerNode {
    fn random<R: RandSrc + ?Sized>(r: &mut R) -> Self {
        ProofInnerNode {
            height: r.get_int8(),
            size: r.get_int64(),
            version: r.get_int64(),
            left: Bytes::random(r),
            right: Bytes::random(r),
        }
    }
}

/// A leaf at the bottom of a proof path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ProofLeafNode {
    pub key: Bytes,
    pub value_hash: Bytes,
    pub version: i64,
}

impl Encoder for ProofLeafNode {
    fn encode(&self, writer: &mut BytesMut) -> Result<()> {
        encode_byte_slice(writer, &self.key);
        encode_byte_slice(writer, &self.value_hash);
        encode_varint(writer, self.version);
        Ok(())
    }
}

impl Decoder for ProofLeafNode {
    fn decode(reader: &mut Bytes) -> Result<Self> {
        Ok(ProofLeafNode {
            key: decode_byte_slice(reader)?,
            value_hash: decode_byte_slice(reader)?,
            version: i64::decode(reader)?,
        })
    }
}

impl DeepCopy for ProofLeafNode {
    fn deep_copy(&self) -> Self {
        ProofLeafNode {
            key: self.key.deep_copy(),
            value_hash: self.value_hash.deep_copy(),
            version: self.version,
        }
    }
}

impl Random for ProofLeafNode {
    fn random<R: RandSrc + ?Sized>(r: &mut R) -> Self {
        ProofLeafNode {
            key: Bytes::random(r),
            value_hash: Bytes::random(r),
            version: r.get_int64(),
        }
    }
}

/// Inner nodes from the root down to a leaf.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct PathToLeaf(pub Vec<ProofInnerNode>);

impl Deref for PathToLeaf {
    type Target = Vec<ProofInnerNode>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for PathToLeaf {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl From<Vec<ProofInnerNode>> for PathToLeaf {
    fn from(nodes: Vec<ProofInnerNode>) -> Self {
        PathToLeaf(nodes)
    }
}

impl FromIterator<ProofInnerNode> for PathToLeaf {
    fn from_iter<I: IntoIterator<Item = ProofInnerNode>>(iter: I) -> Self {
        PathToLeaf(iter.into_iter().collect())
    }
}

impl Encoder for PathToLeaf {
    fn encode(&self, writer: &mut BytesMut) -> Result<()> {
        self.0.encode(writer)
    }
}

impl Decoder for PathToLeaf {
    fn decode(reader: &mut Bytes) -> Result<Self> {
        Ok(PathToLeaf(Vec::decode(reader)?))
    }
}

impl DeepCopy for PathToLeaf {
    fn deep_copy(&self) -> Self {
        PathToLeaf(self.0.deep_copy())
    }
}

impl Random for PathToLeaf {
    fn random<R: RandSrc + ?Sized>(r: &mut R) -> Self {
        PathToLeaf(Vec::random(r))
    }
}

/// A proof that a contiguous run of leaves hashes up to a root.
///
/// `left_path` leads to the first leaf; `inner_nodes` holds one path per
/// following leaf. The codec does not require `leaves` to be non-empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct RangeProof {
    pub left_path: PathToLeaf,
    pub inner_nodes: Vec<PathToLeaf>,
    pub leaves: Vec<ProofLeafNode>,
    /// Cache flag set once the root hash has been checked.
    pub root_verified: bool,
    pub root_hash: Bytes,
    /// The range reaches the rightmost leaf of the tree.
    pub tree_end: bool,
}

impl Encoder for RangeProof {
    fn encode(&self, writer: &mut BytesMut) -> Result<()> {
        self.left_path.encode(writer)?;
        self.inner_nodes.encode(writer)?;
        self.leaves.encode(writer)?;
        self.root_verified.encode(writer)?;
        encode_byte_slice(writer, &self.root_hash);
        self.tree_end.encode(writer)?;
        Ok(())
    }
}

impl Decoder for RangeProof {
    fn decode(reader: &mut Bytes) -> Result<Self> {
        Ok(RangeProof {
            left_path: PathToLeaf::decode(reader)?,
            inner_nodes: Vec::decode(reader)?,
            leaves: Vec::decode(reader)?,
            root_verified: bool::decode(reader)?,
            root_hash: decode_byte_slice(reader)?,
            tree_end: bool::decode(reader)?,
        })
    }
}

impl DeepCopy for RangeProof {
    fn deep_copy(&self) -> Self {
        RangeProof {
            left_path: self.left_path.deep_copy(),
            inner_nodes: self.inner_nodes.deep_copy(),
            leaves: self.leaves.deep_copy(),
            root_verified: self.root_verified,
            root_hash: self.root_hash.deep_copy(),
            tree_end: self.tree_end,
        }
    }
}

impl Random for RangeProof {
    fn random<R: RandSrc + ?Sized>(r: &mut R) -> Self {
        RangeProof {
            left_path: PathToLeaf::random(r),
            inner_nodes: Vec::random(r),
            leaves: Vec::random(r),
            root_verified: r.get_bool(),
            root_hash: Bytes::random(r),
            tree_end: r.get_bool(),
        }
    }
}
