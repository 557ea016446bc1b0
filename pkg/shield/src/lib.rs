#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::match_bool)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]

//! UTXO cryptography for the shielded pool
//!
//! This crate owns everything a client needs to hold and spend hidden
//! value: spending [`Keypair`]s and their shielded addresses, [`Utxo`]
//! records with their commitments and nullifiers, the [`ExtData`] blob that
//! binds public context into a proof, and the [`TransferWitness`] whose
//! public-signal ordering is the contract with the proof circuits.
//!
//! The circuits themselves are an external capability behind the
//! [`Prover`] trait; [`HashProver`] is the in-repo stand-in that validates
//! witnesses the way the circuit's constraints would.

mod error;
mod ext_data;
mod keypair;
mod note_cipher;
mod prover;
mod utxo;
mod witness;

pub use error::{CryptoError, NotInserted};
pub use ext_data::{Account, ExtData};
pub use keypair::{Keypair, ShieldedAddress};
pub use prover::{Arity, HashProver, Proof, Prover, ProverError};
pub use utxo::Utxo;
pub use witness::{
    DummyNote, InputSlot, OutputNote, SpendNote, TransferWitness, SIGNAL_EXT_DATA_HASH,
    SIGNAL_FIRST_NULLIFIER, SIGNAL_PUBLIC_AMOUNT, SIGNAL_ROOT,
};
