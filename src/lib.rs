//! Layered Merkle tree with single-leaf proofs, index-based multiproofs
//! and proof flags.
//!
//! The tree is built once from an ordered collection of leaves and a
//! caller-supplied hash function, stores every layer leaves-first, and is
//! immutable afterwards. On top of that it produces and verifies:
//!
//! - single-leaf inclusion proofs ([`MerkleTree::proof`] / [`verify_proof`]),
//! - index-based multiproofs over the 1-based heap addressing of the tree
//!   ([`proof_indices`], [`MerkleTree::multiproof`], [`verify_multiproof`]),
//! - boolean proof flags for compact streaming verifiers
//!   ([`MerkleTree::proof_flags`]).
//!
//! Construction supports leaf hashing, byte-wise leaf and pair sorting,
//! odd-node duplication, and the Bitcoin double-hash/byte-reversal
//! combination rule (see [`TreeOptions`]).
//!
//! ```
//! use layered_merkle_tree::{MerkleTree, TreeOptions};
//!
//! let hash = |data: &[u8]| blake3::hash(data).as_bytes().to_vec();
//! let tree = MerkleTree::new(
//!     ["a", "b", "c", "d"],
//!     hash,
//!     TreeOptions { hash_leaves: true, ..Default::default() },
//! );
//! let leaf = hash(b"c");
//! let proof = tree.proof(leaf.clone(), None);
//! assert!(tree.verify(&proof, leaf, tree.root()));
//! ```

#![warn(missing_docs)]

mod buffer;
mod error;
pub(crate) mod hash;
mod multiproof;
mod proof;
mod tree;


pub use buffer::{LeafInput, is_hex_like, normalize, to_hex, wrap_hash_fn};
pub use error::MerkleTreeError;
pub use multiproof::{multiproof_from_flat, proof_indices, verify_multiproof};
pub use proof::{ProofStep, Side, decode_proof, encode_proof, verify_proof};
pub use tree::{MerkleTree, TreeOptions};
