use shield::ProverError;
use thiserror::Error;
use zk_primitives::Element;

pub use grove::TreeFull;

use crate::custody::CustodyError;

/// The nullifier has already been recorded
///
/// Permanent: the same spend can never succeed later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("nullifier {nullifier} has already been spent")]
pub struct DoubleSpend {
    /// The nullifier that was seen before
    pub nullifier: Element,
}

/// Why a transaction was not accepted
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    /// An input nullifier was already spent; never retried
    #[error(transparent)]
    DoubleSpend(#[from] DoubleSpend),

    /// The proof's root fell out of the recent-root window; regenerate the
    /// proof against the current root and resubmit
    #[error("proof was generated against a root outside the recent-root window")]
    StaleRoot,

    /// The accumulator has no room for the transaction's outputs
    #[error(transparent)]
    TreeFull(#[from] TreeFull),

    /// The bridged token amount does not match the proof-bound external
    /// amount; a mismatch is a potential attack signal, never retried
    #[error("bridged amount does not match the proof-bound external amount")]
    AmountMismatch,

    /// The bridge message id was already consumed
    #[error("bridge message was already consumed")]
    ReplayedDeposit,

    /// The prover rejected the witness
    #[error("proof generation failed: {0}")]
    ProofGeneration(#[from] ProverError),

    /// The proof does not verify, or does not speak for the submitted
    /// ext data
    #[error("proof failed verification")]
    InvalidProof,

    /// The deposit exceeds the configured maximum
    #[error("deposit of {amount} exceeds the maximum of {maximum}")]
    DepositTooLarge {
        /// The attempted deposit
        amount: u128,
        /// `PoolConfig::maximum_deposit_amount`
        maximum: u128,
    },

    /// The withdrawal is below the configured minimum
    #[error("withdrawal of {amount} is below the minimum of {minimum}")]
    WithdrawalTooSmall {
        /// The attempted withdrawal
        amount: u128,
        /// `PoolConfig::minimum_withdrawal_amount`
        minimum: u128,
    },

    /// An input UTXO has no accepted position in the accumulator, so no
    /// membership path exists for it
    #[error("input has no accepted position in the pool")]
    UnspendableInput,

    /// The public amounts do not fit the signed 128-bit range
    #[error("public amount magnitudes exceed the representable range")]
    AmountOverflow,

    /// More inputs than the largest circuit takes
    #[error("transfer spends {0} inputs, more than the largest circuit takes")]
    TooManyInputs(usize),

    /// More outputs than the circuits produce
    #[error("transfer creates {0} outputs, circuits produce exactly two")]
    TooManyOutputs(usize),

    /// A token movement could not be performed
    #[error(transparent)]
    Custody(#[from] CustodyError),

    /// The bridge payload did not decode as a transaction bundle
    #[error("bridge payload is not a valid transaction bundle")]
    MalformedPayload,
}

impl PoolError {
    /// Whether resubmitting the same logical transaction can succeed
    ///
    /// Only [`PoolError::StaleRoot`] qualifies: the transaction itself is
    /// fine, it just proved against a root the pool has since forgotten.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StaleRoot)
    }
}
