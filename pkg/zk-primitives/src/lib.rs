#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::match_bool)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]
#![deny(missing_docs)]

//! Core field-element and hashing primitives for the shielded pool
//!
//! Everything in the pool that ends up inside a proof (commitments,
//! nullifiers, Merkle nodes, public amounts) is an [`Element`], and every
//! hash is the same poseidon permutation the proof circuits constrain. If
//! the two ever disagree, proofs stop meaning anything, so this crate is the
//! single owner of that binding.

mod element;
mod hash;
mod path;

pub use element::Element;
pub use hash::{hash_bytes, hash_merge};
pub use path::compute_merkle_root;

/// The base field element used by the proof circuits
///
/// This is (roughly) an integer modulo `p` where `p` is [`Element::MODULUS`]
pub type Base = poseidon_circuit::Bn256Fr;
