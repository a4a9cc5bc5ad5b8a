//! Layer-by-layer Merkle tree construction and the read-only query surface.

use crate::{
    buffer::{LeafInput, normalize, raw_bytes, to_hex},
    hash::combine_pair,
};

/// Construction options for a [`MerkleTree`].
///
/// All flags default to off and compose freely, except that
/// `bitcoin_tree` supersedes `duplicate_odd` for unpaired nodes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeOptions {
    /// Hash every input leaf before insertion.
    pub hash_leaves: bool,
    /// Sort the leaf layer byte-wise before building.
    pub sort_leaves: bool,
    /// Order each sibling pair byte-wise before combining, producing
    /// commutative parent hashes.
    pub sort_pairs: bool,
    /// Shorthand that turns on both `sort_leaves` and `sort_pairs`.
    pub sort: bool,
    /// Combine an unpaired trailing node with itself instead of promoting
    /// it to the next layer unhashed.
    pub duplicate_odd: bool,
    /// Use the Bitcoin combination rule: byte-reverse both operands,
    /// double-hash, byte-reverse the result.
    pub bitcoin_tree: bool,
}

impl TreeOptions {
    /// Apply the `sort` shorthand to the individual flags.
    pub(crate) fn resolved(mut self) -> Self {
        if self.sort {
            self.sort_leaves = true;
            self.sort_pairs = true;
        }
        self
    }
}

/// A Merkle tree storing every layer, leaves-first.
///
/// Built once from an input leaf sequence and immutable thereafter; all
/// remaining operations are read-only queries or proof operations, so a
/// built tree is safe to share freely across threads.
///
/// The hash function is caller-supplied and treated as opaque; the crate
/// never assumes a digest length or algorithm. Use
/// [`wrap_hash_fn`](crate::wrap_hash_fn) if the function's output needs
/// normalization first.
pub struct MerkleTree<F> {
    pub(crate) options: TreeOptions,
    pub(crate) hash: F,
    pub(crate) leaves: Vec<Vec<u8>>,
    pub(crate) layers: Vec<Vec<Vec<u8>>>,
}

impl<F> MerkleTree<F>
where
    F: Fn(&[u8]) -> Vec<u8>,
{
    /// Build a tree from `leaves`, hashing and combining with `hash`.
    ///
    /// Leaves accept any supported input form (see
    /// [`LeafInput`](crate::LeafInput)). An empty input yields a
    /// degenerate tree whose root is the empty byte vector.
    pub fn new<I>(leaves: I, hash: F, options: TreeOptions) -> Self
    where
        I: IntoIterator,
        I::Item: Into<LeafInput>,
    {
        let options = options.resolved();
        // Hashed leaves see the raw input form (text as UTF-8); only
        // unhashed leaves go through hex-aware normalization.
        let mut leaves: Vec<Vec<u8>> = leaves
            .into_iter()
            .map(|leaf| {
                if options.hash_leaves {
                    hash(&raw_bytes(leaf.into()))
                } else {
                    normalize(leaf.into())
                }
            })
            .collect();
        if options.sort_leaves {
            leaves.sort();
        }

        let mut tree = MerkleTree {
            options,
            hash,
            layers: vec![leaves.clone()],
            leaves,
        };
        tree.build_layers();
        tree
    }

    /// Combine adjacent pairs into parent layers until a single root
    /// remains. Layer 0 (the leaves) is already in place.
    fn build_layers(&mut self) {
        let mut nodes: Vec<Vec<u8>> = self.leaves.clone();
        while nodes.len() > 1 {
            let mut layer: Vec<Vec<u8>> = Vec::with_capacity(nodes.len().div_ceil(2));
            let mut i = 0;
            while i < nodes.len() {
                if i + 1 == nodes.len() {
                    // Unpaired trailing node.
                    let last = &nodes[i];
                    if self.options.bitcoin_tree {
                        // Bitcoin pairs the odd node with itself.
                        layer.push(combine_pair(last, last, false, true, &self.hash));
                        i += 2;
                        continue;
                    }
                    if !self.options.duplicate_odd {
                        // Lonely leaf: promoted unhashed.
                        layer.push(last.clone());
                        i += 2;
                        continue;
                    }
                    // duplicate_odd falls through to the generic rule with
                    // right = left.
                }
                let left = &nodes[i];
                let right = if i + 1 == nodes.len() { left } else { &nodes[i + 1] };
                layer.push(combine_pair(
                    left,
                    right,
                    self.options.sort_pairs,
                    self.options.bitcoin_tree,
                    &self.hash,
                ));
                i += 2;
            }
            self.layers.push(layer.clone());
            nodes = layer;
        }
    }

    /// The leaf layer (after build-time hashing/sorting).
    pub fn leaves(&self) -> &[Vec<u8>] {
        &self.leaves
    }

    /// The leaf layer as `0x`-prefixed hex strings.
    pub fn hex_leaves(&self) -> Vec<String> {
        self.leaves.iter().map(|leaf| to_hex(leaf)).collect()
    }

    /// Filter the leaf layer to entries matching the provided values.
    ///
    /// Values are re-hashed (and re-sorted) consistently with the
    /// build-time options before matching by byte equality.
    pub fn leaves_matching<I>(&self, values: I) -> Vec<Vec<u8>>
    where
        I: IntoIterator,
        I::Item: Into<LeafInput>,
    {
        let mut values: Vec<Vec<u8>> = if self.options.hash_leaves {
            values
                .into_iter()
                .map(|value| (self.hash)(&raw_bytes(value.into())))
                .collect()
        } else {
            values
                .into_iter()
                .map(|value| normalize(value.into()))
                .collect()
        };
        if self.options.hash_leaves && self.options.sort_leaves {
            values.sort();
        }
        self.leaves
            .iter()
            .filter(|leaf| values.iter().any(|value| value == *leaf))
            .cloned()
            .collect()
    }

    /// All layers, leaves-first, root-last.
    pub fn layers(&self) -> &[Vec<Vec<u8>>] {
        &self.layers
    }

    /// All layers as `0x`-prefixed hex strings.
    pub fn hex_layers(&self) -> Vec<Vec<String>> {
        self.layers
            .iter()
            .map(|layer| layer.iter().map(|node| to_hex(node)).collect())
            .collect()
    }

    /// All layers flattened into the 1-based heap addressing of a complete
    /// binary tree: a single zero-byte sentinel at index 0, the root at
    /// index 1, and leaf `i` at index `2^depth + i`.
    pub fn layers_flat(&self) -> Vec<Vec<u8>> {
        let mut flat = Vec::with_capacity(1 + self.layers.iter().map(Vec::len).sum::<usize>());
        flat.push(vec![0]);
        for layer in self.layers.iter().rev() {
            flat.extend(layer.iter().cloned());
        }
        flat
    }

    /// The flattened layers as `0x`-prefixed hex strings.
    pub fn hex_layers_flat(&self) -> Vec<String> {
        self.layers_flat().iter().map(|node| to_hex(node)).collect()
    }

    /// The root commitment, or the empty byte vector for an empty tree.
    pub fn root(&self) -> Vec<u8> {
        self.layers
            .last()
            .and_then(|layer| layer.first())
            .cloned()
            .unwrap_or_default()
    }

    /// The root as a `0x`-prefixed hex string.
    pub fn hex_root(&self) -> String {
        to_hex(&self.root())
    }

    /// Tree depth: the number of layers minus one.
    pub fn depth(&self) -> usize {
        self.layers.len() - 1
    }

    /// The options the tree was built with (after `sort` resolution).
    pub fn options(&self) -> TreeOptions {
        self.options
    }

    /// First index whose leaf equals `leaf` byte-wise, if any.
    pub(crate) fn leaf_index_of(&self, leaf: &[u8]) -> Option<usize> {
        self.leaves.iter().position(|candidate| candidate == leaf)
    }

    /// The sibling of `index` within `layer`, if it exists.
    pub(crate) fn pair_node(layer: &[Vec<u8>], index: usize) -> Option<usize> {
        let pair = if index % 2 == 0 { index + 1 } else { index - 1 };
        (pair < layer.len()).then_some(pair)
    }
}
