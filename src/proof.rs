//! Single-leaf inclusion proof generation and verification.
//!
//! A proof is an ordered sequence of sibling nodes from the leaf layer up
//! to (but excluding) the root. Verification is a pure function: it replays
//! the combination rule and never needs the tree, only the hash function
//! and the options the tree was built with.

use bincode::{Decode, Encode};

use crate::{
    MerkleTreeError,
    buffer::{LeafInput, normalize, to_hex},
    hash::combine_pair,
    tree::{MerkleTree, TreeOptions},
};

/// Which side of the accumulator a proof sibling goes on during replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode)]
pub enum Side {
    /// The sibling is concatenated before the accumulator.
    Left,
    /// The sibling is concatenated after the accumulator.
    Right,
}

/// One step of a single-leaf inclusion proof.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct ProofStep {
    /// Side the sibling goes on. `None` only on Bitcoin-mode last-leaf
    /// proofs, where the accumulator is always the right operand's
    /// counterpart; replay treats `None` as [`Side::Right`].
    pub side: Option<Side>,
    /// The sibling node bytes.
    pub data: Vec<u8>,
}

/// Maximum decoded proof size (100 MB), matching the crate's other
/// deserialization limits.
const MAX_PROOF_BYTES: usize = 100 * 1024 * 1024;

/// Encode a proof to bytes using bincode.
pub fn encode_proof(proof: &[ProofStep]) -> Result<Vec<u8>, MerkleTreeError> {
    let config = bincode::config::standard()
        .with_big_endian()
        .with_no_limit();
    bincode::encode_to_vec(proof, config)
        .map_err(|e| MerkleTreeError::InvalidProof(format!("encode error: {}", e)))
}

/// Decode a proof from bytes using bincode.
pub fn decode_proof(bytes: &[u8]) -> Result<Vec<ProofStep>, MerkleTreeError> {
    let config = bincode::config::standard()
        .with_big_endian()
        .with_limit::<MAX_PROOF_BYTES>();
    let (proof, _): (Vec<ProofStep>, _) = bincode::decode_from_slice(bytes, config)
        .map_err(|e| MerkleTreeError::InvalidProof(format!("decode error: {}", e)))?;
    Ok(proof)
}

/// Verify that `proof` connects `target` to `root` under the given
/// combination `options`.
///
/// This is a predicate, not a fallible operation: structurally invalid
/// input (an empty proof, a corrupted step) yields `false`, never an
/// error. With `sort_pairs` the stored sides are advisory only — replay
/// orders each pair byte-wise instead. Bitcoin replay ignores
/// `sort_pairs`.
pub fn verify_proof<L, R, F>(
    proof: &[ProofStep],
    target: L,
    root: R,
    hash: &F,
    options: TreeOptions,
) -> bool
where
    L: Into<LeafInput>,
    R: Into<LeafInput>,
    F: Fn(&[u8]) -> Vec<u8>,
{
    let options = options.resolved();
    if proof.is_empty() {
        return false;
    }
    let root = normalize(root.into());
    let mut acc = normalize(target.into());
    for step in proof {
        let sibling_left = step.side == Some(Side::Left);
        acc = if options.bitcoin_tree {
            if sibling_left {
                combine_pair(&step.data, &acc, false, true, hash)
            } else {
                combine_pair(&acc, &step.data, false, true, hash)
            }
        } else if options.sort_pairs {
            combine_pair(&acc, &step.data, true, false, hash)
        } else if sibling_left {
            combine_pair(&step.data, &acc, false, false, hash)
        } else {
            combine_pair(&acc, &step.data, false, false, hash)
        };
    }
    acc == root
}

impl<F> MerkleTree<F>
where
    F: Fn(&[u8]) -> Vec<u8>,
{
    /// Generate the inclusion proof for a target leaf.
    ///
    /// Without an explicit `index` the leaf is resolved by a first-match
    /// byte-equality scan, so callers holding duplicate leaf values must
    /// pass the index to disambiguate. An unknown leaf or out-of-range
    /// index yields an empty proof.
    pub fn proof<L>(&self, leaf: L, index: Option<usize>) -> Vec<ProofStep>
    where
        L: Into<LeafInput>,
    {
        let leaf = normalize(leaf.into());
        let Some(mut index) = index.or_else(|| self.leaf_index_of(&leaf)) else {
            return Vec::new();
        };
        if index >= self.leaves.len() {
            return Vec::new();
        }

        let mut proof = Vec::new();
        if self.options.bitcoin_tree && index == self.leaves.len() - 1 {
            // Bitcoin last-leaf proofs carry no side: an unpaired node at
            // the end of a layer contributes its own bytes (self-pairing)
            // and even-index steps reference the node itself.
            for layer in &self.layers[..self.layers.len() - 1] {
                let pair = if index % 2 == 1 { index - 1 } else { index };
                if pair < layer.len() {
                    proof.push(ProofStep {
                        side: None,
                        data: layer[pair].clone(),
                    });
                }
                index /= 2;
            }
        } else {
            for layer in &self.layers {
                let sibling_right = index % 2 == 0;
                let pair = if sibling_right { index + 1 } else { index - 1 };
                if pair < layer.len() {
                    proof.push(ProofStep {
                        side: Some(if sibling_right { Side::Right } else { Side::Left }),
                        data: layer[pair].clone(),
                    });
                }
                index /= 2;
            }
        }
        proof
    }

    /// The proof's sibling nodes as `0x`-prefixed hex strings (sides are
    /// dropped).
    pub fn hex_proof<L>(&self, leaf: L, index: Option<usize>) -> Vec<String>
    where
        L: Into<LeafInput>,
    {
        self.proof(leaf, index)
            .iter()
            .map(|step| to_hex(&step.data))
            .collect()
    }

    /// Verify a proof against this tree's combination rule. See
    /// [`verify_proof`].
    pub fn verify<L, R>(&self, proof: &[ProofStep], target: L, root: R) -> bool
    where
        L: Into<LeafInput>,
        R: Into<LeafInput>,
    {
        verify_proof(proof, target, root, &self.hash, self.options)
    }
}
