use std::collections::VecDeque;

use zk_primitives::Element;

/// A bounded history of recent tree roots
///
/// Acceptance validates proofs against a window of recent roots rather than
/// only the absolute latest, so a proof generated moments before a
/// concurrent insertion isn't spuriously rejected. Roots older than the
/// window are forgotten and proofs against them must be regenerated.
///
/// ```rust
/// # use grove::*;
/// # use zk_primitives::Element;
/// let mut history = RootHistory::new(2, Element::new(100));
///
/// history.push(Element::new(101));
/// assert!(history.contains(Element::new(100)));
/// assert!(history.contains(Element::new(101)));
///
/// // pushing a third root evicts the oldest
/// history.push(Element::new(102));
/// assert!(!history.contains(Element::new(100)));
/// ```
#[derive(Debug, Clone)]
pub struct RootHistory {
    window: usize,
    roots: VecDeque<Element>,
}

impl RootHistory {
    /// Create a history retaining at most `window` roots, seeded with the
    /// tree's current root
    ///
    /// # Panics
    ///
    /// Panics if `window` is zero: the current root must always be
    /// verifiable.
    #[must_use]
    pub fn new(window: usize, initial_root: Element) -> Self {
        assert!(window > 0, "root history window must be at least 1");

        let mut roots = VecDeque::with_capacity(window);
        roots.push_back(initial_root);

        Self { window, roots }
    }

    /// Record a new root, evicting the oldest if the window is full
    pub fn push(&mut self, root: Element) {
        if self.latest() == root {
            return;
        }

        if self.roots.len() == self.window {
            self.roots.pop_front();
        }

        self.roots.push_back(root);
    }

    /// Whether `root` is within the retained window
    #[must_use]
    pub fn contains(&self, root: Element) -> bool {
        self.roots.iter().any(|&r| r == root)
    }

    /// The most recently recorded root
    #[must_use]
    pub fn latest(&self) -> Element {
        // the deque is never empty: new() seeds it and push() never drains it
        *self.roots.back().unwrap()
    }

    /// Iterate over the retained roots, oldest first
    pub fn iter(&self) -> impl Iterator<Item = Element> + '_ {
        self.roots.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_evicts_oldest_first() {
        let mut history = RootHistory::new(3, Element::new(0));

        for i in 1..=5u64 {
            history.push(Element::new(i));
        }

        assert_eq!(history.iter().count(), 3);
        assert!(!history.contains(Element::new(1)));
        assert!(!history.contains(Element::new(2)));
        assert!(history.contains(Element::new(3)));
        assert!(history.contains(Element::new(4)));
        assert!(history.contains(Element::new(5)));
        assert_eq!(history.latest(), Element::new(5));
    }

    #[test]
    fn duplicate_latest_root_is_not_recorded_twice() {
        let mut history = RootHistory::new(2, Element::new(0));

        history.push(Element::new(0));
        history.push(Element::new(0));
        assert_eq!(history.iter().count(), 1);

        // the initial root survives because the duplicates never evicted it
        history.push(Element::new(1));
        assert!(history.contains(Element::new(0)));
    }
}
