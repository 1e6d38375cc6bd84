//! Proof operators: a key plus the range proof that proves its value or its
//! absence, pluggable into a multi-step proof verification chain.
//!
//! The Merkle arithmetic lives behind [`RangeProofVerifier`]; this module only
//! moves operators in and out of their keyed [`ProofOp`] records.

use crate::framing::{marshal_binary_length_prefixed, unmarshal_binary_length_prefixed};
use crate::proof::RangeProof;
use crate::random::{RandSrc, Random};
use crate::*;

pub const PROOF_OP_IAVL_VALUE: &str = "iavl:v";
pub const PROOF_OP_IAVL_ABSENCE: &str = "iavl:a";

/// Error reported by a [`RangeProofVerifier`].
pub type VerifyError = Box<dyn std::error::Error + Send + Sync>;

/// Errors returned by proof operators.
#[derive(Debug, thiserror::Error)]
pub enum OpError {
    #[error("unexpected ProofOp.Type; got {got}, want {want}")]
    UnexpectedType { got: String, want: &'static str },
    #[error("expected {expected} args, got {got}")]
    ArgCount { expected: usize, got: usize },
    #[error("{op} carries no range proof")]
    MissingProof { op: &'static str },
    #[error("decoding ProofOp.Data into {op}")]
    Decode {
        op: &'static str,
        #[source]
        source: EncoderError,
    },
    #[error("computing root hash")]
    ComputeRootHash(#[source] VerifyError),
    #[error("verifying value")]
    VerifyItem(#[source] VerifyError),
    #[error("verifying absence")]
    VerifyAbsence(#[source] VerifyError),
}

/// Merkle checks over a decoded [`RangeProof`], supplied by the tree library.
pub trait RangeProofVerifier {
    fn compute_root_hash(&self, proof: &RangeProof) -> Bytes;
    fn verify(&self, proof: &RangeProof, root: &[u8]) -> std::result::Result<(), VerifyError>;
    fn verify_item(
        &self,
        proof: &RangeProof,
        key: &[u8],
        value: &[u8],
    ) -> std::result::Result<(), VerifyError>;
    fn verify_absence(&self, proof: &RangeProof, key: &[u8])
        -> std::result::Result<(), VerifyError>;
}

/// A named, keyed, opaque record carrying one encoded operator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProofOp {
    pub op_type: String,
    pub key: Bytes,
    /// Length-prefixed encoding of the operator.
    pub data: Bytes,
}

/// One step of a proof chain.
pub trait ProofOperator {
    /// Runs the step and returns the root hash it proves.
    fn run(
        &self,
        verifier: &dyn RangeProofVerifier,
        args: &[Bytes],
    ) -> std::result::Result<Vec<Bytes>, OpError>;
    fn get_key(&self) -> &[u8];
    fn proof_op(&self) -> Result<ProofOp>;
}

/// Proves that `key` maps to the single value passed to `run`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IavlValueOp {
    /// Carried in `ProofOp.key`.
    pub key: Bytes,
    /// `None` only for an empty tree.
    pub proof: Option<Box<RangeProof>>,
}

/// Proves that `key` is absent from the tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IavlAbsenceOp {
    /// Carried in `ProofOp.key`.
    pub key: Bytes,
    /// `None` for an empty tree, in which every key is absent.
    pub proof: Option<Box<RangeProof>>,
}

// Both operators share one layout: key bytes, then the proof fields inline with
// no tag and no presence marker.
macro_rules! impl_proof_operator_codec {
    ($t:ident, $name:literal, $op_type:expr) => {
        impl $t {
            pub const NAME: &'static str = $name;

            pub fn new(key: impl Into<Bytes>, proof: Option<RangeProof>) -> Self {
                $t {
                    key: key.into(),
                    proof: proof.map(Box::new),
                }
            }

            /// Rebuilds the operator from its record. The key comes from the
            /// record itself, the proof from its data.
            pub fn from_proof_op(pop: &ProofOp) -> std::result::Result<Self, OpError> {
                if pop.op_type != $op_type {
                    return Err(OpError::UnexpectedType {
                        got: pop.op_type.clone(),
                        want: $op_type,
                    });
                }
                let op: $t = unmarshal_binary_length_prefixed(&pop.data)
                    .map_err(|source| OpError::Decode { op: $name, source })?;
                Ok($t {
                    key: pop.key.clone(),
                    proof: op.proof,
                })
            }

            fn to_proof_op(&self) -> Result<ProofOp> {
                Ok(ProofOp {
                    op_type: $op_type.to_string(),
                    key: self.key.clone(),
                    data: marshal_binary_length_prefixed(self)?,
                })
            }
        }

        impl Encoder for $t {
            fn encode(&self, writer: &mut BytesMut) -> Result<()> {
                let proof = self.proof.as_ref().ok_or_else(|| {
                    EncoderError::Encode(format!(
                        "{} has no proof; a missing proof has no wire representation",
                        $name
                    ))
                })?;
                self.key.encode(writer)?;
                proof.encode(writer)
            }
        }

        impl Decoder for $t {
            fn decode(reader: &mut Bytes) -> Result<Self> {
                Ok($t {
                    key: Bytes::decode(reader)?,
                    proof: Some(Box::new(RangeProof::decode(reader)?)),
                })
            }
        }

        impl DeepCopy for $t {
            fn deep_copy(&self) -> Self {
                $t {
                    key: self.key.deep_copy(),
                    proof: self.proof.deep_copy(),
                }
            }
        }

        impl Random for $t {
            fn random<R: RandSrc + ?Sized>(r: &mut R) -> Self {
                $t {
                    key: Bytes::random(r),
                    proof: Some(Box::random(r)),
                }
            }
        }

        impl std::fmt::Display for $t {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}{{{:?}}}", $name, &self.key[..])
            }
        }
    };
}

impl_proof_operator_codec!(IavlValueOp, "IAVLValueOp", PROOF_OP_IAVL_VALUE);
impl_proof_operator_codec!(IavlAbsenceOp, "IAVLAbsenceOp", PROOF_OP_IAVL_ABSENCE);

impl ProofOperator for IavlValueOp {
    /// Takes the value as its only argument.
    fn run(
        &self,
        verifier: &dyn RangeProofVerifier,
        args: &[Bytes],
    ) -> std::result::Result<Vec<Bytes>, OpError> {
        if args.len() != 1 {
            return Err(OpError::ArgCount {
                expected: 1,
                got: args.len(),
            });
        }
        let proof = self
            .proof
            .as_deref()
            .ok_or(OpError::MissingProof { op: Self::NAME })?;

        // The root is trusted here; the chain checks it against the final root.
        let root = verifier.compute_root_hash(proof);
        verifier
            .verify(proof, &root)
            .map_err(OpError::ComputeRootHash)?;
        verifier
            .verify_item(proof, &self.key, &args[0])
            .map_err(OpError::VerifyItem)?;
        Ok(vec![root])
    }

    fn get_key(&self) -> &[u8] {
        &self.key
    }

    fn proof_op(&self) -> Result<ProofOp> {
        self.to_proof_op()
    }
}

impl ProofOperator for IavlAbsenceOp {
    /// Takes no arguments.
    fn run(
        &self,
        verifier: &dyn RangeProofVerifier,
        args: &[Bytes],
    ) -> std::result::Result<Vec<Bytes>, OpError> {
        if !args.is_empty() {
            return Err(OpError::ArgCount {
                expected: 0,
                got: args.len(),
            });
        }
        // An empty tree has an empty root hash and holds no keys.
        let Some(proof) = self.proof.as_deref() else {
            return Ok(vec![Bytes::new()]);
        };

        let root = verifier.compute_root_hash(proof);
        verifier
            .verify(proof, &root)
            .map_err(OpError::ComputeRootHash)?;
        verifier
            .verify_absence(proof, &self.key)
            .map_err(OpError::VerifyAbsence)?;
        Ok(vec![root])
    }

    fn get_key(&self) -> &[u8] {
        &self.key
    }

    fn proof_op(&self) -> Result<ProofOp> {
        self.to_proof_op()
    }
}
