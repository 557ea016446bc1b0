use zk_primitives::{hash_merge, Element};

use crate::{Grove, TreeFull};

impl<const DEPTH: usize> Grove<DEPTH> {
    /// Append one commitment, returning its leaf index
    ///
    /// The hashes along the leaf's path to the root are recomputed eagerly
    /// and the new root is recorded in the root history.
    ///
    /// ```rust
    /// # use grove::*;
    /// # use zk_primitives::Element;
    /// let mut tree = Grove::<4>::new(8);
    ///
    /// let before = tree.root();
    /// let index = tree.insert(Element::new(7)).unwrap();
    /// assert_eq!(index, 0);
    /// assert_ne!(tree.root(), before);
    ///
    /// // the displaced root stays valid within the history window
    /// assert!(tree.is_recent_root(before));
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`TreeFull`] once `2^DEPTH` leaves have been inserted.
    pub fn insert(&mut self, commitment: Element) -> Result<u64, TreeFull> {
        let indices = self.insert_batch(&[commitment])?;
        Ok(indices[0])
    }

    /// Append several commitments as one unit, returning their leaf indices
    ///
    /// Either every commitment is appended or none are: if the batch would
    /// overflow the tree, the tree is left untouched. The root history
    /// records a single entry for the whole batch, so one accepted
    /// transaction consumes exactly one slot of the staleness window.
    ///
    /// ```rust
    /// # use grove::*;
    /// # use zk_primitives::Element;
    /// let mut tree = Grove::<4>::new(8);
    ///
    /// let indices = tree
    ///     .insert_batch(&[Element::new(1), Element::new(2)])
    ///     .unwrap();
    /// assert_eq!(indices, vec![0, 1]);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`TreeFull`] if the batch does not fit; no leaf is inserted.
    pub fn insert_batch(&mut self, commitments: &[Element]) -> Result<Vec<u64>, TreeFull> {
        let remaining = Self::capacity() - self.len();
        if commitments.len() as u64 > remaining {
            return Err(TreeFull {
                capacity: Self::capacity(),
            });
        }

        let mut indices = Vec::with_capacity(commitments.len());

        for &commitment in commitments {
            let index = self.len();
            self.set_node(0, index, commitment);
            self.recompute_ancestors(index);
            indices.push(index);
        }

        let root = self.root();
        self.roots_mut().push(root);

        tracing::debug!(
            leaves = commitments.len(),
            first_index = indices.first(),
            %root,
            "inserted commitment batch",
        );

        Ok(indices)
    }

    /// Recompute the hashes on the path from leaf `index` to the root
    fn recompute_ancestors(&mut self, index: u64) {
        let mut node_index = index;

        for level in 0..DEPTH {
            node_index >>= 1;

            let left = self.node(level, node_index * 2);
            let right = self.node(level, node_index * 2 + 1);
            self.set_node(level + 1, node_index, hash_merge([left, right]));
        }
    }

    /// Write the node at (`level`, `index`), which must either exist already
    /// or be the next unfilled slot of its level
    fn set_node(&mut self, level: usize, index: u64, value: Element) {
        let level_nodes = self.level_mut(level);
        let index = usize::try_from(index).expect("indices fit in usize");

        match index == level_nodes.len() {
            true => level_nodes.push(value),
            false => level_nodes[index] = value,
        }
    }

    fn level_mut(&mut self, level: usize) -> &mut Vec<Element> {
        &mut self.levels[level]
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use test_strategy::proptest;
    use zk_primitives::Element;

    use crate::{empty_tree_hash, Grove, TreeFull};

    #[test]
    fn empty_root_matches_empty_subtree_hash() {
        let tree = Grove::<5>::new(4);
        assert_eq!(tree.root(), empty_tree_hash(5));
        assert!(tree.is_recent_root(tree.root()));
    }

    #[test]
    fn assigned_leaves_never_move() {
        let mut tree = Grove::<6>::new(8);

        for i in 0..20u64 {
            let index = tree.insert(Element::new(1000 + i)).unwrap();
            assert_eq!(index, i);
        }

        for i in 0..20u64 {
            assert_eq!(tree.leaf(i), Some(Element::new(1000 + i)));
        }
    }

    #[test]
    fn insertion_order_determines_root() {
        let mut a = Grove::<6>::new(8);
        let mut b = Grove::<6>::new(8);

        for i in 0..10u64 {
            a.insert(Element::new(i)).unwrap();
            b.insert(Element::new(i)).unwrap();
        }

        assert_eq!(a.root(), b.root());

        // a different insertion order gives a different root: position matters
        let mut c = Grove::<6>::new(8);
        for i in (0..10u64).rev() {
            c.insert(Element::new(i)).unwrap();
        }
        assert_ne!(a.root(), c.root());
    }

    #[test]
    fn full_tree_rejects_inserts() {
        let mut tree = Grove::<2>::new(8);

        for i in 0..4u64 {
            tree.insert(Element::new(i + 1)).unwrap();
        }

        let err = tree.insert(Element::new(99)).unwrap_err();
        assert_eq!(err, TreeFull { capacity: 4 });
        assert_eq!(tree.len(), 4);
    }

    #[test]
    fn overflowing_batch_leaves_tree_untouched() {
        let mut tree = Grove::<2>::new(8);
        tree.insert_batch(&[Element::new(1), Element::new(2), Element::new(3)])
            .unwrap();

        let root_before = tree.root();
        let batch = [Element::new(4), Element::new(5)];

        tree.insert_batch(&batch).unwrap_err();
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.root(), root_before);
    }

    #[test]
    fn batch_records_one_root() {
        let mut tree = Grove::<5>::new(16);
        let initial_roots: Vec<_> = tree.recent_roots().collect();
        assert_eq!(initial_roots.len(), 1);

        tree.insert_batch(&[Element::new(1), Element::new(2), Element::new(3)])
            .unwrap();

        // initial root + one batch root, not one per leaf
        assert_eq!(tree.recent_roots().count(), 2);
    }

    #[proptest(cases = 16)]
    fn every_insert_changes_the_root(
        #[strategy(proptest::collection::vec(proptest::arbitrary::any::<Element>(), 1..16))]
        mut leaves: Vec<Element>,
    ) {
        for leaf in &mut leaves {
            leaf.canonicalize();
        }

        let mut tree = Grove::<8>::new(64);
        let mut roots = HashSet::new();
        roots.insert(tree.root());

        for &leaf in &leaves {
            tree.insert(leaf).unwrap();
            roots.insert(tree.root());
        }

        // a NULL_HASH leaf is indistinguishable from the empty slot it fills,
        // so only the other leaves produce new roots
        let meaningful = leaves.iter().filter(|l| **l != Element::NULL_HASH).count();
        assert_eq!(roots.len(), 1 + meaningful);
        assert_eq!(tree.len(), leaves.len() as u64);
    }
}
