use std::collections::HashSet;
use std::sync::Arc;

use borsh::{BorshDeserialize, BorshSerialize};
use grove::{Grove, LeafNotFound, Path, TreeFull};
use parking_lot::Mutex;
use shield::{ExtData, Proof, Prover};
use zk_primitives::Element;

use crate::{DoubleSpend, Funding, NullifierSet, PoolConfig, PoolError, TokenCustody};

/// A fully proved transaction, ready for acceptance
///
/// This is the wire unit: the bridge payload is the borsh encoding of one
/// of these, and direct submissions hand one to [`Pool::submit`]. The
/// witness it was proved from never appears here.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct TransactionRequest {
    /// The transfer proof and its public signals
    pub proof: Proof,
    /// The public context the proof's ext-data hash commits to
    pub ext_data: ExtData,
    /// How the deposit's public leg is funded, if there is one
    pub funding: Funding,
}

/// What acceptance assigned to a transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accepted {
    /// The root after the transaction's outputs were appended
    pub root: Element,
    /// The leaf indices of the output commitments, in slot order
    pub leaf_indices: Vec<u64>,
}

/// Everything acceptance mutates, owned by one lock
struct PoolState<const DEPTH: usize> {
    tree: Grove<DEPTH>,
    nullifiers: NullifierSet,
}

/// The shielded pool: the ledger of record for hidden value
///
/// Cloning a `Pool` yields another handle onto the same state. All
/// mutation funnels through [`Pool::submit`], which holds the single
/// acceptance lock for the whole check-then-mutate unit, so of two racing
/// transactions spending the same nullifier exactly one wins.
pub struct Pool<const DEPTH: usize> {
    state: Arc<Mutex<PoolState<DEPTH>>>,
    prover: Arc<dyn Prover>,
    custody: Arc<dyn TokenCustody>,
    config: PoolConfig,
}

impl<const DEPTH: usize> Clone for Pool<DEPTH> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            prover: Arc::clone(&self.prover),
            custody: Arc::clone(&self.custody),
            config: self.config.clone(),
        }
    }
}

impl<const DEPTH: usize> Pool<DEPTH> {
    /// An empty pool under the given policy, proving backend, and token
    /// custody
    #[must_use]
    pub fn new(
        config: PoolConfig,
        prover: Arc<dyn Prover>,
        custody: Arc<dyn TokenCustody>,
    ) -> Self {
        let state = PoolState {
            tree: Grove::new(config.root_history_size),
            nullifiers: NullifierSet::new(),
        };

        Self {
            state: Arc::new(Mutex::new(state)),
            prover,
            custody,
            config,
        }
    }

    /// The pool's policy
    #[must_use]
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    pub(crate) fn prover(&self) -> &Arc<dyn Prover> {
        &self.prover
    }

    /// The current root and the paths for `indices`, taken under one lock
    /// so every path verifies against the returned root
    pub(crate) fn snapshot_paths(
        &self,
        indices: &[u64],
    ) -> Result<(Element, Vec<Path<DEPTH>>), LeafNotFound> {
        let state = self.state.lock();
        let paths = indices
            .iter()
            .map(|&index| state.tree.path_for(index))
            .collect::<Result<_, _>>()?;

        Ok((state.tree.root(), paths))
    }

    /// The current accumulator root
    #[must_use]
    pub fn current_root(&self) -> Element {
        self.state.lock().tree.root()
    }

    /// Whether proofs against `root` are still acceptable
    #[must_use]
    pub fn is_recent_root(&self, root: Element) -> bool {
        self.state.lock().tree.is_recent_root(root)
    }

    /// The authentication path for the commitment at `index`, against the
    /// current root
    ///
    /// # Errors
    ///
    /// [`LeafNotFound`] when no commitment sits at `index`.
    pub fn path_for(&self, index: u64) -> Result<Path<DEPTH>, LeafNotFound> {
        self.state.lock().tree.path_for(index)
    }

    /// Whether `nullifier` has been spent
    #[must_use]
    pub fn is_spent(&self, nullifier: Element) -> bool {
        self.state.lock().nullifiers.contains(nullifier)
    }

    /// The number of commitments accepted so far
    #[must_use]
    pub fn len(&self) -> u64 {
        self.state.lock().tree.len()
    }

    /// Whether the pool has accepted any commitment yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.lock().tree.is_empty()
    }

    /// Accept a transaction, or reject it without a trace
    ///
    /// Checks run in a fixed order: proof shape, proof-to-ext-data
    /// binding, proof verification, policy limits, then under the lock
    /// the root window,
    /// nullifier freshness, capacity, custody movement, and finally the
    /// atomic record-and-append. A rejection at any point leaves the pool
    /// exactly as it was.
    ///
    /// # Errors
    ///
    /// See [`PoolError`]; only [`PoolError::StaleRoot`] is worth retrying.
    pub fn submit(&self, request: &TransactionRequest) -> Result<Accepted, PoolError> {
        let proof = &request.proof;
        let ext = &request.ext_data;

        // a decoded wire proof can claim any signal shape; reject it
        // before the signal accessors index into it
        if !proof.is_well_formed() {
            return Err(PoolError::InvalidProof);
        }

        // the proof must speak for exactly this ext data
        if proof.ext_data_hash() != ext.hash() || proof.public_amount() != ext.public_amount() {
            return Err(PoolError::InvalidProof);
        }
        if !self.prover.verify(proof) {
            return Err(PoolError::InvalidProof);
        }

        self.check_policy(ext)?;

        let mut state = self.state.lock();

        if !state.tree.is_recent_root(proof.merkle_root()) {
            tracing::debug!(root = %proof.merkle_root(), "rejecting stale root");
            return Err(PoolError::StaleRoot);
        }

        // freshness of every nullifier, including against each other
        let mut batch = HashSet::new();
        for &nullifier in proof.input_nullifiers() {
            if state.nullifiers.contains(nullifier) || !batch.insert(nullifier) {
                tracing::warn!(%nullifier, "rejecting double spend");
                return Err(DoubleSpend { nullifier }.into());
            }
        }

        let outputs = proof.output_commitments();
        if state.tree.len() + outputs.len() as u64 > Grove::<DEPTH>::capacity() {
            return Err(TreeFull {
                capacity: Grove::<DEPTH>::capacity(),
            }
            .into());
        }

        // custody before mutation: a failed token movement must leave no
        // shielded state behind
        self.move_tokens(request)?;

        for &nullifier in proof.input_nullifiers() {
            state.nullifiers.record(nullifier)?;
        }
        let leaf_indices = state.tree.insert_batch(outputs)?;
        let root = state.tree.root();

        tracing::info!(
            %root,
            ?leaf_indices,
            nullifiers = proof.input_nullifiers().len(),
            ext_amount = ext.ext_amount,
            "accepted transaction",
        );

        Ok(Accepted { root, leaf_indices })
    }

    fn check_policy(&self, ext: &ExtData) -> Result<(), PoolError> {
        let amount = ext.ext_amount.unsigned_abs();

        if ext.ext_amount > 0 && amount > self.config.maximum_deposit_amount {
            return Err(PoolError::DepositTooLarge {
                amount,
                maximum: self.config.maximum_deposit_amount,
            });
        }
        if ext.ext_amount < 0 && amount < self.config.minimum_withdrawal_amount {
            return Err(PoolError::WithdrawalTooSmall {
                amount,
                minimum: self.config.minimum_withdrawal_amount,
            });
        }

        Ok(())
    }

    /// Perform the public token movements the ext data calls for
    fn move_tokens(&self, request: &TransactionRequest) -> Result<(), PoolError> {
        let ext = &request.ext_data;
        let amount = ext.ext_amount.unsigned_abs();

        if ext.ext_amount > 0 {
            if let Funding::Collect(from) = request.funding {
                self.custody.collect(from, amount)?;
            }
        } else if ext.ext_amount < 0 {
            match ext.is_l1_withdrawal {
                true => self.custody.bridge_out(ext.recipient, amount)?,
                false => self.custody.disburse(ext.recipient, amount)?,
            }
        }

        if ext.fee > 0 {
            self.custody.disburse(ext.relayer, ext.fee)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rand_chacha::ChaChaRng;
    use shield::{Account, Keypair, Utxo};
    use testutil::{rng, Harness};

    use crate::{Funding, PoolConfig, PoolError, TransferRequest};

    fn harness() -> Harness<8> {
        Harness::new(PoolConfig {
            minimum_withdrawal_amount: 50,
            maximum_deposit_amount: 1_000,
            ..PoolConfig::default()
        })
    }

    fn deposit(owner: &Keypair, amount: u128, funder: Account, rng: &mut ChaChaRng) -> TransferRequest {
        TransferRequest {
            outputs: vec![Utxo::new(amount, owner.clone(), rng)],
            funding: Funding::Collect(funder),
            ..TransferRequest::default()
        }
    }

    #[test]
    fn deposit_moves_tokens_into_custody() {
        let mut rng = rng(10);
        let harness = harness();
        let alice = Account::from_label("alice");
        harness.ledger.mint(alice, 500);

        let owner = Keypair::generate(&mut rng);
        let receipt = harness
            .pool
            .transaction(&deposit(&owner, 300, alice, &mut rng), &mut rng)
            .unwrap();

        assert_eq!(receipt.accepted.leaf_indices, vec![0, 1]);
        assert_eq!(harness.ledger.balance_of(alice), 200);
        assert_eq!(harness.ledger.balance_of(harness.pool_account), 300);
        assert_eq!(harness.pool.len(), 2);
    }

    #[test]
    fn underfunded_deposit_is_rejected_without_state_changes() {
        let mut rng = rng(11);
        let harness = harness();
        let alice = Account::from_label("alice");
        harness.ledger.mint(alice, 10);

        let owner = Keypair::generate(&mut rng);
        let err = harness
            .pool
            .transaction(&deposit(&owner, 300, alice, &mut rng), &mut rng)
            .unwrap_err();

        assert!(matches!(err, PoolError::Custody(_)));
        assert!(harness.pool.is_empty());
        assert_eq!(harness.ledger.balance_of(alice), 10);
    }

    #[test]
    fn deposits_above_the_maximum_are_rejected() {
        let mut rng = rng(12);
        let harness = harness();
        let alice = Account::from_label("alice");
        harness.ledger.mint(alice, 10_000);

        let owner = Keypair::generate(&mut rng);
        let err = harness
            .pool
            .transaction(&deposit(&owner, 2_000, alice, &mut rng), &mut rng)
            .unwrap_err();

        assert_eq!(
            err,
            PoolError::DepositTooLarge {
                amount: 2_000,
                maximum: 1_000
            }
        );
    }

    #[test]
    fn withdrawals_below_the_minimum_are_rejected() {
        let mut rng = rng(13);
        let harness = harness();
        let alice = Account::from_label("alice");
        harness.ledger.mint(alice, 1_000);

        let owner = Keypair::generate(&mut rng);
        let receipt = harness
            .pool
            .transaction(&deposit(&owner, 500, alice, &mut rng), &mut rng)
            .unwrap();

        let note = receipt.outputs[0].clone();
        let change = Utxo::new(490, owner.clone(), &mut rng);
        let err = harness
            .pool
            .transaction(
                &TransferRequest {
                    inputs: vec![note],
                    outputs: vec![change],
                    recipient: alice,
                    ..TransferRequest::default()
                },
                &mut rng,
            )
            .unwrap_err();

        assert_eq!(
            err,
            PoolError::WithdrawalTooSmall {
                amount: 10,
                minimum: 50
            }
        );
    }

    #[test]
    fn double_spends_are_rejected() {
        let mut rng = rng(14);
        let harness = harness();
        let alice = Account::from_label("alice");
        harness.ledger.mint(alice, 1_000);

        let owner = Keypair::generate(&mut rng);
        let receipt = harness
            .pool
            .transaction(&deposit(&owner, 500, alice, &mut rng), &mut rng)
            .unwrap();
        let note = receipt.outputs[0].clone();

        let spend = |rng: &mut ChaChaRng| TransferRequest {
            inputs: vec![note.clone()],
            outputs: vec![Utxo::new(400, owner.clone(), rng)],
            recipient: alice,
            ..TransferRequest::default()
        };

        harness.pool.transaction(&spend(&mut rng), &mut rng).unwrap();

        let err = harness
            .pool
            .transaction(&spend(&mut rng), &mut rng)
            .unwrap_err();
        assert!(matches!(err, PoolError::DoubleSpend(_)));
        assert!(!err.is_retryable());
    }

    #[test]
    fn tampered_ext_data_is_rejected() {
        let mut rng = rng(15);
        let harness = harness();
        let alice = Account::from_label("alice");
        harness.ledger.mint(alice, 1_000);

        let owner = Keypair::generate(&mut rng);
        let prepared = harness
            .pool
            .prepare_transaction(&deposit(&owner, 300, alice, &mut rng), &mut rng)
            .unwrap();

        let mut request = prepared.request().clone();
        request.ext_data.recipient = Account::from_label("attacker");

        assert_eq!(
            harness.pool.submit(&request).unwrap_err(),
            PoolError::InvalidProof
        );
    }

    #[test]
    fn roots_stay_valid_within_the_window_and_expire_outside_it() {
        let mut rng = rng(16);
        let harness = Harness::<8>::new(PoolConfig {
            root_history_size: 2,
            minimum_withdrawal_amount: 1,
            maximum_deposit_amount: 1_000,
            ..PoolConfig::default()
        });
        let alice = Account::from_label("alice");
        harness.ledger.mint(alice, 1_000);
        let owner = Keypair::generate(&mut rng);

        // proved against the current root
        let early = harness
            .pool
            .prepare_transaction(&deposit(&owner, 100, alice, &mut rng), &mut rng)
            .unwrap();

        // one intervening acceptance: the observed root is still recent
        harness
            .pool
            .transaction(&deposit(&owner, 10, alice, &mut rng), &mut rng)
            .unwrap();
        assert!(harness.pool.is_recent_root(early.observed_root()));
        harness.pool.submit(early.request()).unwrap();

        // two more acceptances push a fresh proof's root out of the window
        let late = harness
            .pool
            .prepare_transaction(&deposit(&owner, 10, alice, &mut rng), &mut rng)
            .unwrap();
        for _ in 0..2 {
            harness
                .pool
                .transaction(&deposit(&owner, 10, alice, &mut rng), &mut rng)
                .unwrap();
        }
        assert!(!harness.pool.is_recent_root(late.observed_root()));

        let err = harness.pool.submit(late.request()).unwrap_err();
        assert_eq!(err, PoolError::StaleRoot);
        assert!(err.is_retryable());
    }
}
