//! Index-based multiproof generation, verification and proof flags.
//!
//! Multiproofs work over the 1-based heap addressing of a complete binary
//! tree of depth `d`: the root sits at address 1, leaf `i` at `2^d + i`,
//! a parent at `address / 2` and a sibling at `address ^ 1`. The index
//! arithmetic is exposed as free functions so verifiers can run without a
//! tree instance; `MerkleTree` methods delegate to them.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::{
    MerkleTreeError,
    buffer::{LeafInput, normalize, to_hex},
    tree::MerkleTree,
};

/// Compute the tree addresses a multiproof for `target_indices` (0-based
/// leaf indices) must supply, for a complete tree of depth `depth`.
///
/// Addresses of the targets themselves are excluded — the verifier is
/// given those leaves directly. A depth at or beyond the pointer width
/// cannot address a real tree and yields no addresses. The result order
/// is deterministic and independent of the order of `target_indices`:
///
/// ```
/// use layered_merkle_tree::proof_indices;
///
/// assert_eq!(proof_indices(&[2, 5, 6], 4), vec![23, 20, 19, 8, 3]);
/// assert_eq!(proof_indices(&[6, 2, 5], 4), vec![23, 20, 19, 8, 3]);
/// ```
pub fn proof_indices(target_indices: &[usize], depth: usize) -> Vec<usize> {
    if depth >= usize::BITS as usize {
        return Vec::new();
    }
    let leaf_count = 1usize << depth;

    // Every sibling on every target's path to the root is a candidate.
    let mut sibling_set = BTreeSet::new();
    for &index in target_indices {
        let mut x = leaf_count + index;
        while x > 1 {
            sibling_set.insert(x ^ 1);
            x /= 2;
        }
    }

    // Candidate order: target addresses first (input order), then the
    // collected siblings in descending address order. The descending walk
    // guarantees children are seen before their covering ancestors.
    let mut candidates: Vec<usize> = target_indices.iter().map(|&i| leaf_count + i).collect();
    candidates.extend(sibling_set.iter().rev());

    // An address is redundant once both children of some ancestor level
    // are already covered; stop marking upward at the first uncovered
    // sibling.
    let mut redundant = HashSet::new();
    let mut proof = Vec::new();
    for &candidate in &candidates {
        if redundant.contains(&candidate) {
            continue;
        }
        proof.push(candidate);
        let mut index = candidate;
        while index > 1 {
            redundant.insert(index);
            if !redundant.contains(&(index ^ 1)) {
                break;
            }
            index /= 2;
        }
    }

    proof.retain(|&index| {
        index
            .checked_sub(leaf_count)
            .is_none_or(|leaf| !target_indices.contains(&leaf))
    });
    proof
}

/// Extract the multiproof nodes for `indices` from a flattened tree (the
/// [`MerkleTree::layers_flat`] layout: sentinel at 0, root at 1).
///
/// This is the instance-free counterpart of [`MerkleTree::multiproof`].
/// Addresses past the end of `flat` (from out-of-range target indices)
/// contribute nothing.
pub fn multiproof_from_flat(flat: &[Vec<u8>], indices: &[usize]) -> Vec<Vec<u8>> {
    let depth = floor_log2(flat.len() / 2);
    proof_indices(indices, depth)
        .iter()
        .filter_map(|&index| flat.get(index).cloned())
        .collect()
}

/// Verify a multiproof against `root` for the leaves at `indices`.
///
/// Rebuilds a sparse address-to-bytes map seeded with the target leaves
/// and the proof nodes (at the addresses [`proof_indices`] derives), then
/// folds known sibling pairs upward. Pair combination is always a single
/// hash of the pair in address order, regardless of tree options.
///
/// A predicate: malformed input yields `false`, including a `depth` no
/// address can represent. Empty `indices` verify trivially.
pub fn verify_multiproof<R, L, P, F>(
    root: R,
    indices: &[usize],
    leaves: L,
    depth: usize,
    proof: P,
    hash: &F,
) -> bool
where
    R: Into<LeafInput>,
    L: IntoIterator,
    L::Item: Into<LeafInput>,
    P: IntoIterator,
    P::Item: Into<LeafInput>,
    F: Fn(&[u8]) -> Vec<u8>,
{
    if depth >= usize::BITS as usize {
        return false;
    }
    let root = normalize(root.into());
    let leaf_count = 1usize << depth;

    let mut tree: BTreeMap<usize, Vec<u8>> = BTreeMap::new();
    for (&index, leaf) in indices.iter().zip(leaves) {
        tree.insert(leaf_count + index, normalize(leaf.into()));
    }
    for (index, node) in proof_indices(indices, depth).into_iter().zip(proof) {
        tree.insert(index, normalize(node.into()));
    }

    // Work queue: all known addresses ascending, except the largest (it is
    // only ever consumed as a sibling). Entries appended mid-walk need not
    // be contiguous with the rest.
    let mut queue: Vec<usize> = tree.keys().copied().collect();
    queue.pop();
    let mut i = 0;
    while i < queue.len() {
        let index = queue[i];
        if index >= 2 && tree.contains_key(&(index ^ 1)) {
            let mut data = tree[&(index & !1)].clone();
            data.extend_from_slice(&tree[&(index | 1)]);
            tree.insert(index / 2, hash(&data));
            queue.push(index / 2);
        }
        i += 1;
    }

    indices.is_empty() || tree.get(&1).is_some_and(|computed| *computed == root)
}

/// Floor of log2; 0 for inputs below 2.
fn floor_log2(mut n: usize) -> usize {
    let mut depth = 0;
    while n > 1 {
        n /= 2;
        depth += 1;
    }
    depth
}

impl<F> MerkleTree<F>
where
    F: Fn(&[u8]) -> Vec<u8>,
{
    /// The multiproof for the given 0-based leaf indices.
    pub fn multiproof(&self, indices: &[usize]) -> Vec<Vec<u8>> {
        multiproof_from_flat(&self.layers_flat(), indices)
    }

    /// The multiproof as `0x`-prefixed hex strings.
    pub fn hex_multiproof(&self, indices: &[usize]) -> Vec<String> {
        self.multiproof(indices)
            .iter()
            .map(|node| to_hex(node))
            .collect()
    }

    /// The multiproof for the given leaf values.
    ///
    /// Values are resolved to leaf indices (after byte-wise reordering of
    /// the inputs under `sort_pairs`) and fail with
    /// [`MerkleTreeError::LeafNotFound`] if any value is absent: a silently
    /// dropped target would corrupt the proof. Collected siblings that are
    /// themselves on a target's path are filtered out by tree position, not
    /// byte equality, so a legitimate proof node that happens to share
    /// bytes with a visited node is kept.
    pub fn multiproof_for_leaves<I>(&self, values: I) -> Result<Vec<Vec<u8>>, MerkleTreeError>
    where
        I: IntoIterator,
        I::Item: Into<LeafInput>,
    {
        let mut values: Vec<Vec<u8>> = values
            .into_iter()
            .map(|value| normalize(value.into()))
            .collect();
        if self.options.sort_pairs {
            values.sort();
        }
        let mut ids = values
            .iter()
            .map(|value| {
                self.leaf_index_of(value)
                    .ok_or(MerkleTreeError::LeafNotFound)
            })
            .collect::<Result<Vec<usize>, _>>()?;
        ids.sort_unstable();

        // Breadth-first walk: at each layer collect the sibling of every
        // live index and carry the deduplicated parent frontier upward.
        let mut visited: HashSet<(usize, usize)> = HashSet::new();
        let mut collected: Vec<(usize, usize)> = Vec::new();
        for (layer_index, layer) in self.layers.iter().enumerate() {
            let mut next_ids = Vec::with_capacity(ids.len());
            for &index in &ids {
                visited.insert(self.canonical_position(layer_index, index));
                if let Some(pair) = Self::pair_node(layer, index) {
                    collected.push((layer_index, pair));
                }
                next_ids.push(index / 2);
            }
            let mut seen = HashSet::new();
            ids = next_ids
                .into_iter()
                .filter(|id| seen.insert(*id))
                .collect();
        }

        Ok(collected
            .into_iter()
            .filter(|&(layer, index)| !visited.contains(&self.canonical_position(layer, index)))
            .map(|(layer, index)| self.layers[layer][index].clone())
            .collect())
    }

    /// Verify a multiproof against this tree's hash function. See the free
    /// [`verify_multiproof`].
    pub fn verify_multiproof<R, L, P>(
        &self,
        root: R,
        indices: &[usize],
        leaves: L,
        depth: usize,
        proof: P,
    ) -> bool
    where
        R: Into<LeafInput>,
        L: IntoIterator,
        L::Item: Into<LeafInput>,
        P: IntoIterator,
        P::Item: Into<LeafInput>,
    {
        verify_multiproof(root, indices, leaves, depth, proof, &self.hash)
    }

    /// For each pairing step over the targets' ancestry, whether the
    /// sibling must be computed from already-known values (`true`) or read
    /// from the supplied `proofs` list (`false`).
    ///
    /// Used by space-optimized verifiers that consume a multiproof as a
    /// flat stream. Fails with [`MerkleTreeError::LeafNotFound`] if any
    /// target value is absent from the leaf set.
    pub fn proof_flags<I>(
        &self,
        leaves: I,
        proofs: &[Vec<u8>],
    ) -> Result<Vec<bool>, MerkleTreeError>
    where
        I: IntoIterator,
        I::Item: Into<LeafInput>,
    {
        let mut ids = leaves
            .into_iter()
            .map(|leaf| {
                self.leaf_index_of(&normalize(leaf.into()))
                    .ok_or(MerkleTreeError::LeafNotFound)
            })
            .collect::<Result<Vec<usize>, _>>()?;
        ids.sort_unstable();

        let mut tested: HashSet<(usize, usize)> = HashSet::new();
        let mut flags = Vec::new();
        for (layer_index, layer) in self.layers.iter().enumerate() {
            let mut next_ids = Vec::with_capacity(ids.len());
            for &index in &ids {
                let position = self.canonical_position(layer_index, index);
                if !tested.contains(&position) {
                    let pair = Self::pair_node(layer, index);
                    let proof_used = proofs.contains(&layer[index])
                        || pair.is_some_and(|pair| proofs.contains(&layer[pair]));
                    if let Some(pair) = pair {
                        flags.push(!proof_used);
                        tested.insert(self.canonical_position(layer_index, pair));
                    }
                    tested.insert(position);
                }
                next_ids.push(index / 2);
            }
            ids = next_ids;
        }
        Ok(flags)
    }

    /// Resolve a `(layer, index)` position to its lowest-layer alias.
    ///
    /// An unpaired trailing node promoted unhashed into the next layer is
    /// the same node at two positions; visited-node bookkeeping must treat
    /// them as one.
    fn canonical_position(&self, mut layer: usize, mut index: usize) -> (usize, usize) {
        while layer > 0 && !self.options.duplicate_odd && !self.options.bitcoin_tree {
            let below = &self.layers[layer - 1];
            if below.len() % 2 == 1 && 2 * index == below.len() - 1 {
                index = below.len() - 1;
                layer -= 1;
            } else {
                break;
            }
        }
        (layer, index)
    }
}
