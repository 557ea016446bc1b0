use std::collections::HashSet;
use std::fmt::{self, Debug, Display};

use borsh::{BorshDeserialize, BorshSerialize};
use parking_lot::Mutex;

use crate::{Accepted, Funding, Pool, PoolError, TransactionRequest};

/// The bridge-assigned identifier of one relayed message
///
/// Assigned by the bridge, not by this system; deposit idempotency is
/// keyed purely on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, BorshSerialize, BorshDeserialize)]
pub struct MessageId(pub [u8; 32]);

impl Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// The pool's adapter for bridged deposits
///
/// The bridge delivers tokens to pool custody and then calls
/// [`BridgeGateway::on_token_bridged`] with the relayed payload. Delivery
/// is at-least-once, so the gateway consumes each message id at most once.
pub struct BridgeGateway<const DEPTH: usize> {
    pool: Pool<DEPTH>,
    consumed: Mutex<HashSet<MessageId>>,
}

impl<const DEPTH: usize> BridgeGateway<DEPTH> {
    /// A gateway feeding the given pool
    #[must_use]
    pub fn new(pool: Pool<DEPTH>) -> Self {
        Self {
            pool,
            consumed: Mutex::new(HashSet::new()),
        }
    }

    /// The pool this gateway feeds
    #[must_use]
    pub fn pool(&self) -> &Pool<DEPTH> {
        &self.pool
    }

    /// Handle one relayed deposit
    ///
    /// `amount` is the token amount the bridge delivered alongside the
    /// message; it must equal the payload's proof-bound external amount
    /// exactly. The payload is the borsh encoding of a
    /// [`TransactionRequest`] prepared with zero inputs; its funding is
    /// forced to [`Funding::Prefunded`] because the tokens arrived with
    /// the message.
    ///
    /// # Errors
    ///
    /// [`PoolError::ReplayedDeposit`] for a message id that was already
    /// consumed, [`PoolError::MalformedPayload`] when the payload does not
    /// decode, [`PoolError::AmountMismatch`] when the delivered amount and
    /// the proof-bound amount disagree, plus anything [`Pool::submit`]
    /// rejects with.
    pub fn on_token_bridged(
        &self,
        amount: u128,
        message_id: MessageId,
        payload: &[u8],
    ) -> Result<Accepted, PoolError> {
        // consume the id up front so a concurrent redelivery short-circuits;
        // released again below if the pool rejects, so the relayer's next
        // delivery attempt can succeed
        if !self.consumed.lock().insert(message_id) {
            tracing::debug!(%message_id, "dropping replayed bridge message");
            return Err(PoolError::ReplayedDeposit);
        }

        let result = self.accept(amount, payload);
        if result.is_err() {
            self.consumed.lock().remove(&message_id);
        }
        result
    }

    fn accept(&self, amount: u128, payload: &[u8]) -> Result<Accepted, PoolError> {
        let mut request = TransactionRequest::try_from_slice(payload)
            .map_err(|_| PoolError::MalformedPayload)?;

        let delivered = i128::try_from(amount).map_err(|_| PoolError::AmountOverflow)?;
        if request.ext_data.ext_amount != delivered {
            tracing::warn!(
                delivered,
                proof_bound = request.ext_data.ext_amount,
                "bridged amount does not match the proof-bound amount",
            );
            return Err(PoolError::AmountMismatch);
        }

        request.funding = Funding::Prefunded;
        self.pool.submit(&request)
    }
}
