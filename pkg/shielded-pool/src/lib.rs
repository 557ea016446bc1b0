#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::match_bool)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

//! The shielded pool service
//!
//! The [`Pool`] is the ledger of record for hidden value: an append-only
//! commitment accumulator plus the permanent nullifier set, mutated only
//! through the single serializing acceptance point ([`Pool::submit`]).
//! Around it sit the client-side transaction assembler
//! ([`Pool::transaction`]), the [`BridgeGateway`] for deposits relayed
//! from the other settlement layer, and the [`TokenCustody`] boundary
//! where public token movements happen.

mod assembler;
mod bridge;
mod config;
mod custody;
mod error;
mod nullifier_set;
mod pool;

pub use assembler::{PreparedTransaction, TransactionReceipt, TransferRequest, TxStage};
pub use bridge::{BridgeGateway, MessageId};
pub use config::{PoolConfig, UNIT};
pub use custody::{CustodyError, Funding, TokenCustody};
pub use error::{DoubleSpend, PoolError, TreeFull};
pub use nullifier_set::NullifierSet;
pub use pool::{Accepted, Pool, TransactionRequest};
