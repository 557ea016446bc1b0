use crate::{hash_merge, Element};

/// Compute the root hash of a Merkle tree from a leaf and its siblings
///
/// `siblings` yields tuples of the sibling hash and a boolean that indicates
/// which side the sibling is on (`false` means the sibling is on the right,
/// `true` means the sibling is on the left), deepest sibling first.
///
/// For example, consider the following tree:
/// ```text
///          ┌─────┐
///          │  C  │
///          └──┬──┘
///       ┌─────┴─────┐
///    ┌──▼──┐     ┌──▼──┐
///    │  A  │     │  B  │
///    └──┬──┘     └──┬──┘
///     ┌─┴─┐       ┌─┴─┐
///   ┌─▼─┐┌─▼─┐  ┌─▼─┐┌─▼─┐
///   │ 0 ││ 1 │  │ 2 ││ 3 │
///   └───┘└───┘  └───┘└───┘
/// ```
/// Here `A = hash_merge([0, 1])`, `B = hash_merge([2, 3])` and
/// `C = hash_merge([A, B])`. To prove that `2` is in the tree:
/// ```rust
/// # use zk_primitives::*;
/// let a = hash_merge([Element::new(0), Element::new(1)]);
/// let b = hash_merge([Element::new(2), Element::new(3)]);
/// let c = hash_merge([a, b]);
///
/// let siblings = [
///     (Element::new(3), false), // sibling on the right
///     (a, true),                // sibling on the left
/// ];
///
/// let root = compute_merkle_root(Element::new(2), siblings);
/// assert_eq!(root, c);
///
/// // a different leaf in the same slot produces a different root
/// let root_if_null = compute_merkle_root(Element::NULL_HASH, siblings);
/// assert_ne!(root_if_null, c);
/// ```
pub fn compute_merkle_root<I: IntoIterator<Item = (Element, bool)>>(
    mut leaf: Element,
    siblings: I,
) -> Element {
    for (sibling, bit) in siblings {
        match bit {
            // bit is 0, this node is on the left
            false => leaf = hash_merge([leaf, sibling]),

            // bit is 1, this node is on the right
            true => leaf = hash_merge([sibling, leaf]),
        }
    }

    leaf
}
