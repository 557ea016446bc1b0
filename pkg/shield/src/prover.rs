use borsh::{BorshDeserialize, BorshSerialize};
use ff::Field;
use sha3::{Digest, Keccak256};
use thiserror::Error;
use zk_primitives::{Base, Element};

use crate::witness::{
    InputSlot, TransferWitness, SIGNAL_EXT_DATA_HASH, SIGNAL_FIRST_NULLIFIER,
    SIGNAL_PUBLIC_AMOUNT, SIGNAL_ROOT,
};

/// The input arities the proving circuits come in
///
/// Outputs are always [`Arity::OUTPUTS`]; a transfer that spends more than
/// two notes jumps straight to the sixteen-input circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum Arity {
    /// Two input slots
    Two,
    /// Sixteen input slots
    Sixteen,
}

impl Arity {
    /// Every circuit produces exactly two outputs
    pub const OUTPUTS: usize = 2;

    /// The number of input slots this circuit takes
    #[must_use]
    pub fn inputs(self) -> usize {
        match self {
            Self::Two => 2,
            Self::Sixteen => 16,
        }
    }

    /// The smallest arity that fits `n` real inputs
    #[must_use]
    pub fn for_inputs(n: usize) -> Option<Self> {
        match n {
            0..=2 => Some(Self::Two),
            3..=16 => Some(Self::Sixteen),
            _ => None,
        }
    }

    /// The number of public signals a proof of this arity carries:
    /// root, public amount, ext-data hash, one nullifier per input slot,
    /// one commitment per output slot
    #[must_use]
    pub fn signal_count(self) -> usize {
        SIGNAL_FIRST_NULLIFIER + self.inputs() + Self::OUTPUTS
    }

    /// The domain tag bound into proofs, so a proof for one circuit never
    /// verifies as the other
    #[must_use]
    fn domain_tag(self) -> &'static [u8] {
        match self {
            Self::Two => b"shield.v1.transfer-2x2",
            Self::Sixteen => b"shield.v1.transfer-16x2",
        }
    }
}

/// A transfer proof: the public signals plus the opaque proof bytes
///
/// Everything acceptance needs is here; the witness it was proved from
/// never leaves the client.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct Proof {
    arity: Arity,
    public_signals: Vec<Element>,
    bytes: Vec<u8>,
}

impl Proof {
    /// Assemble a proof from its wire parts
    ///
    /// Performs no validation; [`Prover::verify`] is the judge of whether
    /// the parts cohere. Backends implementing [`Prover`] build their
    /// output through here.
    #[must_use]
    pub fn from_parts(arity: Arity, public_signals: Vec<Element>, bytes: Vec<u8>) -> Self {
        Self {
            arity,
            public_signals,
            bytes,
        }
    }

    /// The circuit this proof was produced by
    #[must_use]
    pub fn arity(&self) -> Arity {
        self.arity
    }

    /// Whether the signal vector has the length the arity dictates
    ///
    /// A decoded wire proof can claim any shape. The signal accessors
    /// ([`Proof::merkle_root`] and friends) index on the strength of this
    /// check, so acceptance runs it before touching any of them.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        self.public_signals.len() == self.arity.signal_count()
    }

    /// The public signals, in the circuit's fixed order
    #[must_use]
    pub fn public_signals(&self) -> &[Element] {
        &self.public_signals
    }

    /// The opaque proof bytes
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The merkle root the transfer was proved against
    #[must_use]
    pub fn merkle_root(&self) -> Element {
        self.public_signals[SIGNAL_ROOT]
    }

    /// The signed public amount
    #[must_use]
    pub fn public_amount(&self) -> Element {
        self.public_signals[SIGNAL_PUBLIC_AMOUNT]
    }

    /// The digest the transaction's ext data must hash to
    #[must_use]
    pub fn ext_data_hash(&self) -> Element {
        self.public_signals[SIGNAL_EXT_DATA_HASH]
    }

    /// The nullifiers this transfer publishes
    #[must_use]
    pub fn input_nullifiers(&self) -> &[Element] {
        &self.public_signals[SIGNAL_FIRST_NULLIFIER..SIGNAL_FIRST_NULLIFIER + self.arity.inputs()]
    }

    /// The commitments this transfer creates
    #[must_use]
    pub fn output_commitments(&self) -> &[Element] {
        &self.public_signals[SIGNAL_FIRST_NULLIFIER + self.arity.inputs()..]
    }
}

/// Why a witness could not be proved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ProverError {
    /// The witness has the wrong number of input or output slots for the
    /// requested circuit
    #[error("witness has {got} slots where the circuit takes {expected}")]
    SlotMismatch {
        /// Slots the circuit takes
        expected: usize,
        /// Slots the witness has
        got: usize,
    },

    /// A circuit constraint does not hold for this witness
    #[error("witness does not satisfy the circuit: {0}")]
    Unsatisfiable(&'static str),
}

/// The proving backend acceptance and assembly are written against
///
/// Object safe, so services can hold a `Box<dyn Prover>` and swap the
/// backend without recompiling.
pub trait Prover: Send + Sync {
    /// Prove `witness` under the circuit of the given arity
    ///
    /// # Errors
    ///
    /// [`ProverError`] when the witness has the wrong shape or fails a
    /// constraint; a witness that proves here will also verify.
    fn prove(&self, witness: &TransferWitness, arity: Arity) -> Result<Proof, ProverError>;

    /// Check a proof against its own public signals
    fn verify(&self, proof: &Proof) -> bool;
}

/// A hash-binding prover
///
/// Enforces the circuit's constraints directly on the witness (merkle
/// membership of every funded input, and value balance in the field), then
/// binds the public signals with a domain-tagged keccak digest. The digest
/// commits to the signals and the circuit but proves no knowledge, so this
/// backend is for trusted deployments and tests; the trait boundary is
/// where a SNARK backend slots in.
#[derive(Debug, Clone, Copy, Default)]
pub struct HashProver;

impl HashProver {
    fn binding(arity: Arity, signals: &[Element]) -> Vec<u8> {
        let mut hasher = Keccak256::new();
        hasher.update(arity.domain_tag());
        for signal in signals {
            hasher.update(signal.to_be_bytes());
        }
        hasher.finalize().to_vec()
    }
}

impl Prover for HashProver {
    fn prove(&self, witness: &TransferWitness, arity: Arity) -> Result<Proof, ProverError> {
        if witness.inputs.len() != arity.inputs() {
            return Err(ProverError::SlotMismatch {
                expected: arity.inputs(),
                got: witness.inputs.len(),
            });
        }
        if witness.outputs.len() != Arity::OUTPUTS {
            return Err(ProverError::SlotMismatch {
                expected: Arity::OUTPUTS,
                got: witness.outputs.len(),
            });
        }

        // every funded input must sit in the tree at the claimed root;
        // zero-amount inputs (dummies, or fully drained notes) are exempt
        for slot in &witness.inputs {
            if let InputSlot::Spend(note) = slot {
                if note.amount() != 0 && note.merkle_root() != witness.root {
                    return Err(ProverError::Unsatisfiable(
                        "input is not a member of the tree at the claimed root",
                    ));
                }
            }
        }

        // sum(in) + public_amount = sum(out), in the field, so a negative
        // public amount (withdrawal) cancels against the inputs exactly
        let inputs = value_sum(witness.inputs.iter().map(InputSlot::amount));
        let outputs = value_sum(witness.outputs.iter().map(|out| out.amount()));

        if inputs + witness.public_amount.to_base() != outputs {
            return Err(ProverError::Unsatisfiable(
                "input and output values do not balance",
            ));
        }

        let public_signals = witness.public_signals();
        let bytes = Self::binding(arity, &public_signals);

        Ok(Proof {
            arity,
            public_signals,
            bytes,
        })
    }

    fn verify(&self, proof: &Proof) -> bool {
        proof.is_well_formed() && proof.bytes == Self::binding(proof.arity, &proof.public_signals)
    }
}

fn value_sum(amounts: impl Iterator<Item = u128>) -> Base {
    amounts.fold(Base::zero(), |acc, amount| {
        acc + Element::from(amount).to_base()
    })
}

#[cfg(test)]
mod tests {
    use grove::Grove;
    use rand_chacha::{rand_core::SeedableRng, ChaChaRng};

    use super::*;
    use crate::witness::{DummyNote, OutputNote, SpendNote};
    use crate::{Keypair, Utxo};

    fn rng() -> ChaChaRng {
        ChaChaRng::from_seed([6; 32])
    }

    /// A balanced two-input witness spending a 100 note into 60 + 40
    fn balanced_witness(rng: &mut ChaChaRng) -> TransferWitness {
        let mut tree = Grove::<4>::new(8);
        let mut utxo = Utxo::new(100, Keypair::generate(rng), rng);
        let index = tree.insert(utxo.commitment()).unwrap();
        utxo.set_leaf_index(index);

        let path = tree.path_for(index).unwrap();
        let spend = SpendNote::new(&utxo, &path).unwrap();

        let out_a = Utxo::new(60, Keypair::generate(rng), rng);
        let out_b = Utxo::new(40, Keypair::generate(rng), rng);

        TransferWitness {
            root: tree.root(),
            public_amount: Element::ZERO,
            ext_data_hash: Element::new(1),
            inputs: vec![
                InputSlot::Spend(spend),
                InputSlot::Dummy(DummyNote::random(rng)),
            ],
            outputs: vec![OutputNote::new(&out_a), OutputNote::new(&out_b)],
        }
    }

    #[test]
    fn balanced_witness_proves_and_verifies() {
        let mut rng = rng();
        let witness = balanced_witness(&mut rng);

        let proof = HashProver.prove(&witness, Arity::Two).unwrap();
        assert!(HashProver.verify(&proof));

        assert_eq!(proof.merkle_root(), witness.root);
        assert_eq!(proof.input_nullifiers(), witness.input_nullifiers());
        assert_eq!(proof.output_commitments(), witness.output_commitments());
    }

    #[test]
    fn withdrawal_balances_through_a_negative_public_amount() {
        let mut rng = rng();
        let mut witness = balanced_witness(&mut rng);

        // withdraw 40 of the 100: outputs only cover 60
        witness.public_amount = Element::from_i128(-40);
        let change = Utxo::new(60, Keypair::generate(&mut rng), &mut rng);
        let spent = Utxo::new(0, Keypair::generate(&mut rng), &mut rng);
        witness.outputs = vec![OutputNote::new(&change), OutputNote::new(&spent)];

        let proof = HashProver.prove(&witness, Arity::Two).unwrap();
        assert!(HashProver.verify(&proof));
        assert_eq!(proof.public_amount(), Element::from_i128(-40));
    }

    #[test]
    fn unbalanced_witness_is_unsatisfiable() {
        let mut rng = rng();
        let mut witness = balanced_witness(&mut rng);

        // mint from nothing
        let inflated = Utxo::new(1_000, Keypair::generate(&mut rng), &mut rng);
        witness.outputs[0] = OutputNote::new(&inflated);

        assert_eq!(
            HashProver.prove(&witness, Arity::Two).unwrap_err(),
            ProverError::Unsatisfiable("input and output values do not balance"),
        );
    }

    #[test]
    fn membership_is_checked_against_the_claimed_root() {
        let mut rng = rng();
        let mut witness = balanced_witness(&mut rng);
        witness.root = Element::new(12345);

        assert!(matches!(
            HashProver.prove(&witness, Arity::Two).unwrap_err(),
            ProverError::Unsatisfiable(_),
        ));
    }

    #[test]
    fn slot_counts_must_match_the_arity() {
        let mut rng = rng();
        let witness = balanced_witness(&mut rng);

        assert_eq!(
            HashProver.prove(&witness, Arity::Sixteen).unwrap_err(),
            ProverError::SlotMismatch {
                expected: 16,
                got: 2
            },
        );
    }

    #[test]
    fn sixteen_input_witness_pads_with_dummies() {
        let mut rng = rng();
        let mut witness = balanced_witness(&mut rng);
        while witness.inputs.len() < 16 {
            witness.inputs.push(InputSlot::Dummy(DummyNote::random(&mut rng)));
        }

        let proof = HashProver.prove(&witness, Arity::Sixteen).unwrap();
        assert!(HashProver.verify(&proof));
        assert_eq!(proof.input_nullifiers().len(), 16);
    }

    #[test]
    fn tampered_signals_fail_verification() {
        let mut rng = rng();
        let witness = balanced_witness(&mut rng);

        let mut proof = HashProver.prove(&witness, Arity::Two).unwrap();
        proof.public_signals[SIGNAL_PUBLIC_AMOUNT] = Element::new(999);

        assert!(!HashProver.verify(&proof));
    }

    #[test]
    fn short_signal_vectors_are_malformed_and_fail_verification() {
        // a wire proof claiming an arity its signal vector cannot back
        let empty = Proof::from_parts(Arity::Two, vec![], vec![]);
        assert!(!empty.is_well_formed());
        assert!(!HashProver.verify(&empty));

        let mut rng = rng();
        let witness = balanced_witness(&mut rng);
        let proof = HashProver.prove(&witness, Arity::Two).unwrap();
        assert!(proof.is_well_formed());
        assert_eq!(proof.public_signals().len(), Arity::Two.signal_count());

        // truncating a genuine proof also breaks its shape
        let mut signals = proof.public_signals().to_vec();
        signals.pop();
        let truncated = Proof::from_parts(Arity::Two, signals, proof.bytes().to_vec());
        assert!(!truncated.is_well_formed());
        assert!(!HashProver.verify(&truncated));
    }

    #[test]
    fn arity_selection_is_the_smallest_fit() {
        assert_eq!(Arity::for_inputs(0), Some(Arity::Two));
        assert_eq!(Arity::for_inputs(2), Some(Arity::Two));
        assert_eq!(Arity::for_inputs(3), Some(Arity::Sixteen));
        assert_eq!(Arity::for_inputs(16), Some(Arity::Sixteen));
        assert_eq!(Arity::for_inputs(17), None);
    }

    #[test]
    fn proofs_round_trip_through_borsh() {
        let mut rng = rng();
        let witness = balanced_witness(&mut rng);
        let proof = HashProver.prove(&witness, Arity::Two).unwrap();

        let bytes = borsh::to_vec(&proof).unwrap();
        let restored = Proof::try_from_slice(&bytes).unwrap();

        assert_eq!(restored, proof);
        assert!(HashProver.verify(&restored));
    }
}
