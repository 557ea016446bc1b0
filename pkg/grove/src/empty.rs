use std::sync::OnceLock;

use zk_primitives::{hash_merge, Element};

/// The largest supported tree depth
///
/// Leaf indices are `u64`, so anything deeper could not be addressed anyway
pub(crate) const MAX_DEPTH: usize = 63;

/// The hash of an all-empty subtree of the given height
///
/// `empty_tree_hash(0)` is the empty leaf itself ([`Element::NULL_HASH`]);
/// `empty_tree_hash(n)` is the hash-merge of two empty subtrees of height
/// `n - 1`. The full ladder is computed once per process and memoized.
///
/// ```rust
/// # use grove::*;
/// # use zk_primitives::{hash_merge, Element};
/// assert_eq!(empty_tree_hash(0), Element::NULL_HASH);
///
/// let one = empty_tree_hash(1);
/// assert_eq!(one, hash_merge([Element::NULL_HASH, Element::NULL_HASH]));
/// assert_eq!(empty_tree_hash(2), hash_merge([one, one]));
/// ```
///
/// # Panics
///
/// Panics if `height` exceeds the maximum supported depth (63).
#[must_use]
pub fn empty_tree_hash(height: usize) -> Element {
    static HASHES: OnceLock<Vec<Element>> = OnceLock::new();

    let hashes = HASHES.get_or_init(|| {
        let mut hashes = Vec::with_capacity(MAX_DEPTH + 1);
        let mut hash = Element::NULL_HASH;
        hashes.push(hash);

        for _ in 0..MAX_DEPTH {
            hash = hash_merge([hash, hash]);
            hashes.push(hash);
        }

        hashes
    });

    hashes[height]
}
