//! Node combination rules used by layer construction and proof replay.
//!
//! Two rules exist: the generic rule (concatenate the pair, optionally
//! reordered byte-wise, hash once) and the Bitcoin rule (byte-reverse both
//! operands, hash, hash again, byte-reverse the result), matching that
//! chain's historical tree construction.

use crate::buffer::reverse;

/// Combine two sibling nodes into their parent.
///
/// `sort_pairs` reorders the operands by unsigned byte-wise comparison
/// before concatenation; in Bitcoin mode the reordering applies to the
/// already-reversed operands.
pub(crate) fn combine_pair<F>(
    left: &[u8],
    right: &[u8],
    sort_pairs: bool,
    bitcoin_tree: bool,
    hash: &F,
) -> Vec<u8>
where
    F: Fn(&[u8]) -> Vec<u8>,
{
    let mut pair = if bitcoin_tree {
        [reverse(left), reverse(right)]
    } else {
        [left.to_vec(), right.to_vec()]
    };
    if sort_pairs {
        pair.sort();
    }
    let [a, b] = pair;
    let mut data = a;
    data.extend_from_slice(&b);

    let digest = hash(&data);
    if bitcoin_tree {
        reverse(&hash(&digest))
    } else {
        digest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blake3_hash(data: &[u8]) -> Vec<u8> {
        blake3::hash(data).as_bytes().to_vec()
    }

    #[test]
    fn test_generic_combine_is_concat_then_hash() {
        let parent = combine_pair(b"ab", b"cd", false, false, &blake3_hash);
        assert_eq!(parent, blake3_hash(b"abcd"));
    }

    #[test]
    fn test_sorted_combine_is_commutative() {
        let a = combine_pair(b"xy", b"ab", true, false, &blake3_hash);
        let b = combine_pair(b"ab", b"xy", true, false, &blake3_hash);
        assert_eq!(a, b);
        assert_eq!(a, blake3_hash(b"abxy"));
    }

    #[test]
    fn test_bitcoin_combine_reverses_and_double_hashes() {
        let parent = combine_pair(&[1, 2], &[3, 4], false, true, &blake3_hash);
        let expected = {
            let once = blake3_hash(&[2, 1, 4, 3]);
            reverse(&blake3_hash(&once))
        };
        assert_eq!(parent, expected);
    }
}
