use thiserror::Error;

/// The tree's `2^DEPTH` capacity is exhausted
///
/// Fatal for the transaction that triggered it; the pool cannot accept new
/// commitments without operator intervention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("merkle tree is full: all {capacity} leaf slots are occupied")]
pub struct TreeFull {
    /// The fixed capacity of the tree that rejected the insert
    pub capacity: u64,
}

/// No leaf has been inserted at the requested index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no leaf at index {index}: tree holds {len} leaves")]
pub struct LeafNotFound {
    /// The requested leaf index
    pub index: u64,
    /// The number of leaves actually inserted
    pub len: u64,
}
