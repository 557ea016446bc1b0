use grove::Path;
use rand::{CryptoRng, RngCore};
use zk_primitives::{compute_merkle_root, hash_merge, Element};

use crate::keypair::{derive_public_key, sign_with};
use crate::{Keypair, NotInserted, Utxo};

/// A real input: an accepted UTXO together with its authentication path
///
/// The siblings are deepest first and the leaf index supplies the direction
/// bits, so the path material here is exactly a [`Path`] with the const
/// depth erased (witnesses for every tree depth share one prover
/// interface).
#[derive(Debug, Clone)]
pub struct SpendNote {
    amount: u128,
    spend_key: Element,
    blinding: Element,
    leaf_index: u64,
    siblings: Vec<Element>,
}

impl SpendNote {
    /// Assemble the spend witness for `utxo` from its authentication path
    ///
    /// # Errors
    ///
    /// [`NotInserted`] when the UTXO has no leaf index, or when the path
    /// belongs to a different leaf than the one the UTXO was accepted at.
    pub fn new<const DEPTH: usize>(
        utxo: &Utxo,
        path: &Path<DEPTH>,
    ) -> Result<Self, NotInserted> {
        let leaf_index = utxo.leaf_index().ok_or(NotInserted)?;
        if path.leaf_index() != leaf_index {
            return Err(NotInserted);
        }

        Ok(Self {
            amount: utxo.amount(),
            spend_key: utxo.keypair().spend_key(),
            blinding: utxo.blinding(),
            leaf_index,
            siblings: path.siblings().to_vec(),
        })
    }

    /// The hidden amount being spent
    #[must_use]
    pub fn amount(&self) -> u128 {
        self.amount
    }

    /// The commitment this note spends
    #[must_use]
    pub fn commitment(&self) -> Element {
        hash_merge([
            Element::from(self.amount),
            derive_public_key(self.spend_key),
            self.blinding,
        ])
    }

    /// The nullifier published when this note is spent
    #[must_use]
    pub fn nullifier(&self) -> Element {
        let commitment = self.commitment();
        let signature = sign_with(self.spend_key, commitment, self.leaf_index);

        hash_merge([commitment, Element::from(self.leaf_index), signature])
    }

    /// The root this note's path authenticates against
    #[must_use]
    pub fn merkle_root(&self) -> Element {
        let directions = self
            .siblings
            .iter()
            .enumerate()
            .map(|(level, &sibling)| (sibling, (self.leaf_index >> level) & 1 == 1));

        compute_merkle_root(self.commitment(), directions)
    }
}

/// A padding input: a zero-amount note under a throwaway key
///
/// Dummies fill unused input slots up to the circuit arity. They carry no
/// value and no membership claim, but they still publish a nullifier (with
/// leaf index zero) so every slot's signal layout is uniform.
#[derive(Debug, Clone)]
pub struct DummyNote {
    spend_key: Element,
    blinding: Element,
}

impl DummyNote {
    /// A dummy under a fresh random key and blinding
    ///
    /// The key is random so two dummies never share a nullifier.
    pub fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        Self {
            spend_key: Keypair::generate(rng).spend_key(),
            blinding: Element::secure_random(rng),
        }
    }

    /// The zero-amount commitment of this dummy
    #[must_use]
    pub fn commitment(&self) -> Element {
        hash_merge([
            Element::ZERO,
            derive_public_key(self.spend_key),
            self.blinding,
        ])
    }

    /// The dummy's nullifier, computed with leaf index zero
    #[must_use]
    pub fn nullifier(&self) -> Element {
        let commitment = self.commitment();
        let signature = sign_with(self.spend_key, commitment, 0);

        hash_merge([commitment, Element::ZERO, signature])
    }
}

/// One input slot of a transfer witness
#[derive(Debug, Clone)]
pub enum InputSlot {
    /// A real spend, subject to the membership check
    Spend(SpendNote),
    /// A zero-amount filler, exempt from the membership check
    Dummy(DummyNote),
}

impl InputSlot {
    /// The amount this slot contributes to the input side
    #[must_use]
    pub fn amount(&self) -> u128 {
        match self {
            Self::Spend(note) => note.amount(),
            Self::Dummy(_) => 0,
        }
    }

    /// The nullifier this slot publishes
    #[must_use]
    pub fn nullifier(&self) -> Element {
        match self {
            Self::Spend(note) => note.nullifier(),
            Self::Dummy(note) => note.nullifier(),
        }
    }
}

/// One output slot: the fields of a commitment being created
#[derive(Debug, Clone)]
pub struct OutputNote {
    amount: u128,
    public_key: Element,
    blinding: Element,
}

impl OutputNote {
    /// The output witness for a freshly built UTXO
    #[must_use]
    pub fn new(utxo: &Utxo) -> Self {
        Self {
            amount: utxo.amount(),
            public_key: utxo.keypair().public_key(),
            blinding: utxo.blinding(),
        }
    }

    /// The amount this slot contributes to the output side
    #[must_use]
    pub fn amount(&self) -> u128 {
        self.amount
    }

    /// The commitment that will be inserted for this output
    #[must_use]
    pub fn commitment(&self) -> Element {
        hash_merge([Element::from(self.amount), self.public_key, self.blinding])
    }
}

/// The full witness of one shielded transfer
///
/// The private material (spend keys, amounts, blindings, paths) lives in
/// the slots; [`TransferWitness::public_signals`] projects out the public
/// face in the fixed order the circuit exposes:
///
/// | index       | signal                             |
/// |-------------|------------------------------------|
/// | `0`         | recent merkle root                 |
/// | `1`         | signed public amount               |
/// | `2`         | ext data hash                      |
/// | `3..3+n`    | input nullifiers, in slot order    |
/// | `3+n..3+n+2`| output commitments, in slot order  |
///
/// where `n` is the input arity. Verifiers index into this layout, so it
/// can never be reordered.
#[derive(Debug, Clone)]
pub struct TransferWitness {
    /// The root every real input's path must authenticate against
    pub root: Element,
    /// `ext_amount - fee`, embedded into the field
    pub public_amount: Element,
    /// The digest of the transaction's [`ExtData`](crate::ExtData)
    pub ext_data_hash: Element,
    /// The input slots, padded to the circuit arity
    pub inputs: Vec<InputSlot>,
    /// The output slots, always two
    pub outputs: Vec<OutputNote>,
}

/// Signal index of the merkle root
pub const SIGNAL_ROOT: usize = 0;
/// Signal index of the signed public amount
pub const SIGNAL_PUBLIC_AMOUNT: usize = 1;
/// Signal index of the ext data hash
pub const SIGNAL_EXT_DATA_HASH: usize = 2;
/// Signal index of the first input nullifier
pub const SIGNAL_FIRST_NULLIFIER: usize = 3;

impl TransferWitness {
    /// The nullifiers published by this transfer, in slot order
    #[must_use]
    pub fn input_nullifiers(&self) -> Vec<Element> {
        self.inputs.iter().map(InputSlot::nullifier).collect()
    }

    /// The commitments created by this transfer, in slot order
    #[must_use]
    pub fn output_commitments(&self) -> Vec<Element> {
        self.outputs.iter().map(OutputNote::commitment).collect()
    }

    /// The public signals, in the circuit's fixed order
    #[must_use]
    pub fn public_signals(&self) -> Vec<Element> {
        let mut signals =
            Vec::with_capacity(3 + self.inputs.len() + self.outputs.len());

        signals.push(self.root);
        signals.push(self.public_amount);
        signals.push(self.ext_data_hash);
        signals.extend(self.input_nullifiers());
        signals.extend(self.output_commitments());

        signals
    }

    /// Signal index of the first output commitment, after `n` nullifiers
    #[must_use]
    pub fn first_commitment_signal(&self) -> usize {
        SIGNAL_FIRST_NULLIFIER + self.inputs.len()
    }
}
