#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::match_bool)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]
#![deny(missing_docs)]

//! # Grove
//!
//! An append-only Merkle accumulator for shielded-pool commitments.
//!
//! A [`Grove`] is a binary poseidon tree with a fixed depth controlled by a
//! const generic parameter `DEPTH`, giving a capacity of `2^DEPTH` leaves.
//! Unlike a map-like sparse tree, leaves are addressed purely by insertion
//! order: the first commitment gets index 0, the next index 1, and so on.
//! Once assigned, a leaf's value and index never change, and the tree never
//! shrinks or rebalances.
//!
//! ```rust
//! # use grove::*;
//! # use zk_primitives::Element;
//! let mut tree = Grove::<4>::new(8);
//!
//! let index = tree.insert(Element::new(1)).unwrap();
//! assert_eq!(index, 0);
//!
//! let path = tree.path_for(index).unwrap();
//! assert!(path.proves(Element::new(1)));
//! assert_eq!(path.root(), tree.root());
//! ```
//!
//! ## Root history
//!
//! Every insertion produces a new root, and the previous roots stay valid
//! for proof verification within a bounded window (the `root_window`
//! constructor argument). This is what lets a transaction proven against a
//! slightly stale root still be accepted while other transactions land
//! concurrently; see [`Grove::is_recent_root`].
//!
//! ## Empty subtrees
//!
//! Unoccupied slots hold [`Element::NULL_HASH`], and the hash of an
//! all-empty subtree of any height is precomputed once per process (see
//! [`empty_tree_hash`]), so an empty tree costs nothing to build.
//!
//! [`Element::NULL_HASH`]: zk_primitives::Element::NULL_HASH

mod empty;
mod roots;
mod tree;

pub use empty::empty_tree_hash;
pub use roots::RootHistory;
pub use tree::{Grove, LeafNotFound, Path, TreeFull};
