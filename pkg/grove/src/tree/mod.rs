use zk_primitives::Element;

use crate::{empty::MAX_DEPTH, empty_tree_hash, RootHistory};

mod error;
mod insert;
mod path;

pub use error::{LeafNotFound, TreeFull};
pub use path::Path;

/// An append-only Merkle accumulator of depth `DEPTH`
///
/// Commitments are appended left to right; the leaf index is the insertion
/// order. The tree stores every level eagerly (level 0 is the leaves, level
/// `DEPTH` the root), so producing an authentication path is a lookup, not
/// a recomputation.
///
/// ```rust
/// # use grove::*;
/// # use zk_primitives::Element;
/// let mut tree = Grove::<8>::new(30);
/// assert!(tree.is_empty());
///
/// let a = tree.insert(Element::new(10)).unwrap();
/// let b = tree.insert(Element::new(20)).unwrap();
/// assert_eq!((a, b), (0, 1));
///
/// assert_eq!(tree.leaf(0), Some(Element::new(10)));
/// assert_eq!(tree.leaf(2), None);
/// ```
#[derive(Debug, Clone)]
pub struct Grove<const DEPTH: usize> {
    /// `levels[0]` holds the leaves, `levels[DEPTH]` the root (if any leaf
    /// has been inserted). Nodes beyond the filled frontier are implicitly
    /// [`empty_tree_hash`] of their level.
    levels: Vec<Vec<Element>>,
    roots: RootHistory,
}

impl<const DEPTH: usize> Grove<DEPTH> {
    /// Create an empty tree retaining `root_window` recent roots
    ///
    /// # Panics
    ///
    /// Panics if `DEPTH` exceeds 63 (leaf indices are `u64`) or if
    /// `root_window` is zero.
    #[must_use]
    pub fn new(root_window: usize) -> Self {
        assert!(DEPTH <= MAX_DEPTH, "tree depth {DEPTH} exceeds {MAX_DEPTH}");

        Self {
            levels: vec![Vec::new(); DEPTH + 1],
            roots: RootHistory::new(root_window, empty_tree_hash(DEPTH)),
        }
    }

    /// The maximum number of leaves this tree can hold
    #[must_use]
    pub fn capacity() -> u64 {
        1u64 << DEPTH
    }

    /// The number of leaves inserted so far
    #[must_use]
    pub fn len(&self) -> u64 {
        self.levels[0].len() as u64
    }

    /// Whether no leaf has been inserted yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.levels[0].is_empty()
    }

    /// The current root of the tree
    #[must_use]
    pub fn root(&self) -> Element {
        self.node(DEPTH, 0)
    }

    /// The commitment at `index`, if one has been inserted
    #[must_use]
    pub fn leaf(&self, index: u64) -> Option<Element> {
        self.levels[0].get(usize::try_from(index).ok()?).copied()
    }

    /// Whether `root` is the current root or one within the retained window
    ///
    /// Proofs built against roots outside this window must be regenerated.
    #[must_use]
    pub fn is_recent_root(&self, root: Element) -> bool {
        self.roots.contains(root)
    }

    /// The retained root history, oldest first
    pub fn recent_roots(&self) -> impl Iterator<Item = Element> + '_ {
        self.roots.iter()
    }

    /// The node at (`level`, `index`), falling back to the empty-subtree
    /// hash beyond the filled frontier
    pub(crate) fn node(&self, level: usize, index: u64) -> Element {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.levels[level].get(i))
            .copied()
            .unwrap_or_else(|| empty_tree_hash(level))
    }

    pub(crate) fn roots_mut(&mut self) -> &mut RootHistory {
        &mut self.roots
    }
}
