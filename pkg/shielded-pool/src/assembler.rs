//! Client-side transaction assembly
//!
//! Turns a plain statement of intent (spend these notes, create those,
//! move this much public value) into a proved [`TransactionRequest`],
//! padding the slots out to a circuit arity and retrying transparently
//! when the observed root goes stale before acceptance.

use rand::{CryptoRng, RngCore};
use shield::{
    Account, Arity, DummyNote, ExtData, InputSlot, OutputNote, SpendNote, TransferWitness, Utxo,
};
use zk_primitives::Element;

use crate::{Accepted, Funding, Pool, PoolError, TransactionRequest};

/// A statement of transfer intent, before proving
///
/// `inputs` are accepted UTXOs the caller owns; `outputs` are freshly
/// built ones (at most two). The external amount is not stated, it is
/// implied: `fee + sum(outputs) - sum(inputs)`, positive for a deposit,
/// negative for a withdrawal, zero for a fully shielded transfer.
#[derive(Debug, Clone)]
pub struct TransferRequest {
    /// Accepted UTXOs to spend
    pub inputs: Vec<Utxo>,
    /// New UTXOs to create, at most two
    pub outputs: Vec<Utxo>,
    /// Where a withdrawal's public leg goes
    pub recipient: Account,
    /// The account paid the fee
    pub relayer: Account,
    /// Fee paid out of the public leg
    pub fee: u128,
    /// How a deposit's public leg reaches pool custody
    pub funding: Funding,
    /// Route the withdrawal through the bridge to the other layer
    pub is_l1_withdrawal: bool,
}

impl Default for TransferRequest {
    fn default() -> Self {
        Self {
            inputs: Vec::new(),
            outputs: Vec::new(),
            recipient: Account::ZERO,
            relayer: Account::ZERO,
            fee: 0,
            funding: Funding::Prefunded,
            is_l1_withdrawal: false,
        }
    }
}

/// Where an in-flight transfer is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxStage {
    /// Fetching paths and the observed root for the real inputs
    Collecting,
    /// The witness is with the prover
    Proving,
    /// Submitted, awaiting acceptance
    Submitted,
    /// Accepted; output leaf indices are known
    Finalized,
    /// Rejected with a non-retryable error
    Rejected,
}

/// A proved transaction plus the client-side state needed to finish it
#[derive(Debug, Clone)]
pub struct PreparedTransaction {
    request: TransactionRequest,
    outputs: Vec<Utxo>,
    observed_root: Element,
    stage: TxStage,
}

impl PreparedTransaction {
    /// The wire bundle to submit
    #[must_use]
    pub fn request(&self) -> &TransactionRequest {
        &self.request
    }

    /// The output UTXOs, padding included, without leaf indices yet
    #[must_use]
    pub fn outputs(&self) -> &[Utxo] {
        &self.outputs
    }

    /// The root the witness was proved against
    #[must_use]
    pub fn observed_root(&self) -> Element {
        self.observed_root
    }

    /// The lifecycle stage this transfer has reached
    #[must_use]
    pub fn stage(&self) -> TxStage {
        self.stage
    }
}

/// An accepted transfer: what the pool assigned, and the caller's output
/// UTXOs with their leaf indices back-filled and ready to spend
#[derive(Debug, Clone)]
pub struct TransactionReceipt {
    /// The acceptance record
    pub accepted: Accepted,
    /// The output UTXOs, now carrying their accumulator positions
    pub outputs: Vec<Utxo>,
}

impl<const DEPTH: usize> Pool<DEPTH> {
    /// Assemble and prove a transfer against the current root
    ///
    /// Pads the inputs with zero-value dummies up to the smallest circuit
    /// arity that fits, pads the outputs to exactly two, encrypts every
    /// output's metadata to its owner, and hands the witness to the
    /// prover. The pool is only read here; nothing is submitted.
    ///
    /// # Errors
    ///
    /// [`PoolError::TooManyInputs`] / [`PoolError::TooManyOutputs`] for
    /// oversized requests, [`PoolError::UnspendableInput`] when an input
    /// was never accepted, [`PoolError::ProofGeneration`] when the prover
    /// rejects the witness.
    pub fn prepare_transaction<R: RngCore + CryptoRng>(
        &self,
        request: &TransferRequest,
        rng: &mut R,
    ) -> Result<PreparedTransaction, PoolError> {
        let arity = Arity::for_inputs(request.inputs.len())
            .ok_or(PoolError::TooManyInputs(request.inputs.len()))?;
        if request.outputs.len() > Arity::OUTPUTS {
            return Err(PoolError::TooManyOutputs(request.outputs.len()));
        }

        tracing::debug!(
            stage = ?TxStage::Collecting,
            inputs = request.inputs.len(),
            outputs = request.outputs.len(),
            "assembling transfer",
        );

        let indices = request
            .inputs
            .iter()
            .map(|utxo| utxo.leaf_index().ok_or(PoolError::UnspendableInput))
            .collect::<Result<Vec<_>, _>>()?;
        let (observed_root, paths) = self
            .snapshot_paths(&indices)
            .map_err(|_| PoolError::UnspendableInput)?;

        let mut inputs = request
            .inputs
            .iter()
            .zip(&paths)
            .map(|(utxo, path)| {
                let note =
                    SpendNote::new(utxo, path).map_err(|_| PoolError::UnspendableInput)?;
                Ok(InputSlot::Spend(note))
            })
            .collect::<Result<Vec<_>, PoolError>>()?;
        while inputs.len() < arity.inputs() {
            inputs.push(InputSlot::Dummy(DummyNote::random(rng)));
        }

        let mut outputs = request.outputs.clone();
        while outputs.len() < Arity::OUTPUTS {
            outputs.push(Utxo::padding(rng));
        }

        let ext_data = ExtData {
            recipient: request.recipient,
            ext_amount: ext_amount(request, &outputs)?,
            relayer: request.relayer,
            fee: request.fee,
            encrypted_outputs: outputs.iter().map(|u| u.encrypt_metadata(rng)).collect(),
            is_l1_withdrawal: request.is_l1_withdrawal,
        };

        let witness = TransferWitness {
            root: observed_root,
            public_amount: ext_data.public_amount(),
            ext_data_hash: ext_data.hash(),
            inputs,
            outputs: outputs.iter().map(OutputNote::new).collect(),
        };

        tracing::debug!(stage = ?TxStage::Proving, ?arity, "proving transfer");
        let proof = self.prover().prove(&witness, arity)?;

        Ok(PreparedTransaction {
            request: TransactionRequest {
                proof,
                ext_data,
                funding: request.funding,
            },
            outputs,
            observed_root,
            stage: TxStage::Proving,
        })
    }

    /// Prepare, submit, and finalize a transfer
    ///
    /// On [`PoolError::StaleRoot`] the transfer is re-prepared against the
    /// fresh root and resubmitted, up to `config.stale_root_retries`
    /// times; no other rejection is retried. On acceptance the outputs'
    /// leaf indices are back-filled so the caller can spend them next.
    ///
    /// # Errors
    ///
    /// Everything [`Pool::prepare_transaction`] and [`Pool::submit`] can
    /// reject with.
    pub fn transaction<R: RngCore + CryptoRng>(
        &self,
        request: &TransferRequest,
        rng: &mut R,
    ) -> Result<TransactionReceipt, PoolError> {
        let mut attempts = 0;

        loop {
            let mut prepared = self.prepare_transaction(request, rng)?;
            prepared.stage = TxStage::Submitted;

            match self.submit(prepared.request()) {
                Ok(accepted) => {
                    let mut outputs = prepared.outputs;
                    for (utxo, &index) in outputs.iter_mut().zip(&accepted.leaf_indices) {
                        utxo.set_leaf_index(index);
                    }

                    tracing::debug!(stage = ?TxStage::Finalized, root = %accepted.root, "transfer finalized");
                    return Ok(TransactionReceipt { accepted, outputs });
                }
                Err(err) if err.is_retryable() && attempts < self.config().stale_root_retries => {
                    attempts += 1;
                    tracing::debug!(attempts, "observed root went stale, re-preparing");
                }
                Err(err) => {
                    tracing::debug!(stage = ?TxStage::Rejected, %err, "transfer rejected");
                    return Err(err);
                }
            }
        }
    }
}

/// `fee + sum(outputs) - sum(inputs)`, checked into the signed range
fn ext_amount(request: &TransferRequest, outputs: &[Utxo]) -> Result<i128, PoolError> {
    let total = |utxos: &[Utxo]| -> Option<i128> {
        utxos
            .iter()
            .try_fold(0i128, |acc, u| acc.checked_add(i128::try_from(u.amount()).ok()?))
    };

    let sum_in = total(&request.inputs).ok_or(PoolError::AmountOverflow)?;
    let sum_out = total(outputs).ok_or(PoolError::AmountOverflow)?;
    let fee = i128::try_from(request.fee).map_err(|_| PoolError::AmountOverflow)?;

    fee.checked_add(sum_out)
        .and_then(|v| v.checked_sub(sum_in))
        .ok_or(PoolError::AmountOverflow)
}

#[cfg(test)]
mod tests {
    use shield::{Arity, Keypair};
    use testutil::{rng, Harness};

    use super::*;
    use crate::PoolConfig;

    #[test]
    fn small_transfers_use_the_two_input_circuit() {
        let mut rng = rng(20);
        let harness = Harness::<8>::with_defaults();
        let owner = Keypair::generate(&mut rng);

        let request = TransferRequest {
            outputs: vec![Utxo::new(100, owner, &mut rng)],
            ..TransferRequest::default()
        };
        let prepared = harness.pool.prepare_transaction(&request, &mut rng).unwrap();
        let proof = &prepared.request().proof;

        assert_eq!(proof.arity(), Arity::Two);
        assert_eq!(proof.input_nullifiers().len(), 2);
        assert_eq!(proof.output_commitments().len(), 2);

        // the second output slot is padding, but still gets metadata
        assert_eq!(prepared.outputs().len(), 2);
        assert_eq!(prepared.outputs()[1].amount(), 0);
        assert_eq!(prepared.request().ext_data.encrypted_outputs.len(), 2);
    }

    #[test]
    fn oversized_requests_are_rejected_before_proving() {
        let mut rng = rng(21);
        let harness = Harness::<8>::with_defaults();
        let owner = Keypair::generate(&mut rng);

        let too_many_inputs = TransferRequest {
            inputs: (0..17).map(|_| Utxo::new(1, owner.clone(), &mut rng)).collect(),
            ..TransferRequest::default()
        };
        assert_eq!(
            harness
                .pool
                .prepare_transaction(&too_many_inputs, &mut rng)
                .unwrap_err(),
            PoolError::TooManyInputs(17)
        );

        let too_many_outputs = TransferRequest {
            outputs: (0..3).map(|_| Utxo::new(1, owner.clone(), &mut rng)).collect(),
            ..TransferRequest::default()
        };
        assert_eq!(
            harness
                .pool
                .prepare_transaction(&too_many_outputs, &mut rng)
                .unwrap_err(),
            PoolError::TooManyOutputs(3)
        );
    }

    #[test]
    fn pending_inputs_cannot_be_spent() {
        let mut rng = rng(22);
        let harness = Harness::<8>::with_defaults();
        let owner = Keypair::generate(&mut rng);

        // never accepted, so it has no path
        let pending = Utxo::new(100, owner.clone(), &mut rng);
        let request = TransferRequest {
            inputs: vec![pending],
            outputs: vec![Utxo::new(100, owner, &mut rng)],
            ..TransferRequest::default()
        };

        assert_eq!(
            harness.pool.prepare_transaction(&request, &mut rng).unwrap_err(),
            PoolError::UnspendableInput
        );
    }

    #[test]
    fn receipts_carry_spendable_outputs() {
        let mut rng = rng(23);
        let harness = Harness::<8>::new(PoolConfig {
            minimum_withdrawal_amount: 1,
            ..PoolConfig::default()
        });
        let alice = Account::from_label("alice");
        harness.ledger.mint(alice, 1_000);
        let owner = Keypair::generate(&mut rng);

        let receipt = harness
            .pool
            .transaction(
                &TransferRequest {
                    outputs: vec![Utxo::new(600, owner.clone(), &mut rng)],
                    funding: Funding::Collect(alice),
                    ..TransferRequest::default()
                },
                &mut rng,
            )
            .unwrap();

        // the back-filled output spends without further bookkeeping
        let note = receipt.outputs[0].clone();
        assert_eq!(note.leaf_index(), Some(0));

        harness
            .pool
            .transaction(
                &TransferRequest {
                    inputs: vec![note],
                    outputs: vec![Utxo::new(600, owner, &mut rng)],
                    ..TransferRequest::default()
                },
                &mut rng,
            )
            .unwrap();
    }
}
