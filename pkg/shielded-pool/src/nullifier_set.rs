use std::collections::HashSet;

use zk_primitives::Element;

use crate::DoubleSpend;

/// The permanent ledger of spent nullifiers
///
/// Only ever touched inside the pool's acceptance lock, so a nullifier is
/// either unseen or spent; there is no in-between state to race against.
#[derive(Debug, Default, Clone)]
pub struct NullifierSet {
    seen: HashSet<Element>,
}

impl NullifierSet {
    /// An empty set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `nullifier` has been spent
    #[must_use]
    pub fn contains(&self, nullifier: Element) -> bool {
        self.seen.contains(&nullifier)
    }

    /// Record `nullifier` as spent, permanently
    ///
    /// # Errors
    ///
    /// [`DoubleSpend`] if it was already recorded.
    pub fn record(&mut self, nullifier: Element) -> Result<(), DoubleSpend> {
        match self.seen.insert(nullifier) {
            true => Ok(()),
            false => Err(DoubleSpend { nullifier }),
        }
    }

    /// The number of spent nullifiers
    #[must_use]
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Whether nothing has been spent yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
