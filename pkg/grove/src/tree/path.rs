use borsh::{BorshDeserialize, BorshSerialize};
use zk_primitives::{compute_merkle_root, Element};

use crate::{Grove, LeafNotFound};

/// An authentication path for one leaf of a [`Grove`] of depth `DEPTH`
///
/// A path carries the `DEPTH` sibling hashes (deepest first) needed to
/// recompute the root from a leaf, the leaf's index (whose bits select the
/// left/right direction at each level), and the root the path was generated
/// against.
///
/// ```rust
/// # use grove::*;
/// # use zk_primitives::Element;
/// let mut tree = Grove::<4>::new(8);
/// tree.insert(Element::new(5)).unwrap();
/// let index = tree.insert(Element::new(6)).unwrap();
///
/// let path = tree.path_for(index).unwrap();
/// assert!(path.proves(Element::new(6)));
/// assert!(!path.proves(Element::new(5)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Path<const DEPTH: usize> {
    /// The sibling hashes, deepest (closest to the leaf) first
    siblings: Vec<Element>,
    /// The index of the leaf this path belongs to
    leaf_index: u64,
    /// The root of the tree at the time this path was generated
    root: Element,
}

impl<const DEPTH: usize> Path<DEPTH> {
    /// The sibling hashes, deepest first
    #[must_use]
    pub fn siblings(&self) -> &[Element] {
        &self.siblings
    }

    /// The index of the leaf this path proves membership for
    #[must_use]
    pub fn leaf_index(&self) -> u64 {
        self.leaf_index
    }

    /// The root this path was generated against
    ///
    /// This is the root acceptance will validate the proof against, so the
    /// caller must remember it alongside the proof.
    #[must_use]
    pub fn root(&self) -> Element {
        self.root
    }

    /// Each sibling paired with its direction bit
    ///
    /// The bool follows the [`compute_merkle_root`] convention: `true` means
    /// the sibling sits on the left (our node is the right child at that
    /// level), `false` means it sits on the right.
    pub fn siblings_with_directions(&self) -> impl Iterator<Item = (Element, bool)> + '_ {
        self.siblings
            .iter()
            .enumerate()
            .map(|(level, &sibling)| (sibling, (self.leaf_index >> level) & 1 == 1))
    }

    /// Recompute the root this path yields for a hypothetical leaf value
    #[must_use]
    pub fn compute_root(&self, leaf: Element) -> Element {
        compute_merkle_root(leaf, self.siblings_with_directions())
    }

    /// Whether this path proves that `leaf` was in the tree at [`Path::root`]
    #[must_use]
    pub fn proves(&self, leaf: Element) -> bool {
        self.compute_root(leaf) == self.root
    }
}

impl<const DEPTH: usize> Grove<DEPTH> {
    /// The authentication path for the leaf at `index`, against the current
    /// root
    ///
    /// # Errors
    ///
    /// Returns [`LeafNotFound`] if no leaf has been inserted at `index`;
    /// paths exist only for occupied slots.
    pub fn path_for(&self, index: u64) -> Result<Path<DEPTH>, LeafNotFound> {
        if index >= self.len() {
            return Err(LeafNotFound {
                index,
                len: self.len(),
            });
        }

        let siblings = (0..DEPTH)
            .map(|level| self.node(level, (index >> level) ^ 1))
            .collect();

        Ok(Path {
            siblings,
            leaf_index: index,
            root: self.root(),
        })
    }
}
