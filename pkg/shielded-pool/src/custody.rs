use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use shield::Account;
use thiserror::Error;

/// The public token movements acceptance performs
///
/// The pool computes the public amount; an implementation of this trait
/// moves the actual tokens. `testutil::TokenLedger` is the in-memory
/// implementation the scenarios run against.
pub trait TokenCustody: Send + Sync {
    /// Pull a deposit's public leg from `from` into pool custody
    fn collect(&self, from: Account, amount: u128) -> Result<(), CustodyError>;

    /// Pay public value out of pool custody to `to`
    fn disburse(&self, to: Account, amount: u128) -> Result<(), CustodyError>;

    /// Pay a withdrawal out through the bridge, to be delivered to
    /// `recipient` on the other settlement layer
    fn bridge_out(&self, recipient: Account, amount: u128) -> Result<(), CustodyError>;
}

/// An account cannot cover a required token movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("account {account} holds {available} but {required} is required")]
pub struct CustodyError {
    /// The account that came up short
    pub account: Account,
    /// Its balance at the time of the movement
    pub available: u128,
    /// The amount the movement needed
    pub required: u128,
}

/// How a deposit's public leg reaches pool custody
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize,
)]
pub enum Funding {
    /// The tokens already sit with the pool; bridged deposits are delivered
    /// before the gateway is invoked
    Prefunded,
    /// Collect the deposit from this account at acceptance
    Collect(Account),
}
