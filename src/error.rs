use thiserror::Error;

/// Errors from Merkle tree operations.
///
/// Verification predicates (`verify`, `verify_multiproof`) never return
/// errors; they fail closed with `false`. Errors are reserved for operations
/// whose silent failure would corrupt the produced proof material.
#[derive(Debug, Error)]
pub enum MerkleTreeError {
    /// A target leaf value has no matching entry in the tree's leaf set.
    #[error("leaf does not exist in Merkle tree")]
    LeafNotFound,
    /// A serialized proof could not be decoded.
    #[error("invalid proof: {0}")]
    InvalidProof(String),
}
