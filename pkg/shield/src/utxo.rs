use borsh::{BorshDeserialize, BorshSerialize};
use rand::{CryptoRng, RngCore};
use zk_primitives::{hash_merge, Element};

use crate::{CryptoError, Keypair, NotInserted};

/// A hidden value record
///
/// The public trace of a UTXO is its commitment,
/// `poseidon(amount, public_key, blinding)`; nothing else is revealed until
/// it is spent, at which point its nullifier is published exactly once:
/// `poseidon(commitment, leaf_index, sig)`, where `sig` proves knowledge of
/// the spend key.
///
/// A UTXO is unspent from the moment its commitment is accepted into the
/// tree ([`Utxo::set_leaf_index`]) and spent once its nullifier is
/// recorded; in between it is immutable.
#[derive(Debug, Clone)]
pub struct Utxo {
    amount: u128,
    keypair: Keypair,
    blinding: Element,
    leaf_index: Option<u64>,
}

/// The owner-addressed metadata needed to reconstruct a received UTXO
#[derive(BorshSerialize, BorshDeserialize)]
struct NotePlaintext {
    amount: u128,
    blinding: Element,
}

impl Utxo {
    /// Create a UTXO with a fresh random blinding factor
    ///
    /// A zero `amount` is valid: it is the terminal "fully spent, no
    /// change" output.
    pub fn new<R: RngCore + CryptoRng>(amount: u128, keypair: Keypair, rng: &mut R) -> Self {
        Self::new_with_blinding(amount, keypair, Element::secure_random(rng))
    }

    /// Create a UTXO with an explicit blinding factor
    ///
    /// The blinding must be unique per UTXO; reusing one links commitments.
    #[must_use]
    pub fn new_with_blinding(amount: u128, keypair: Keypair, blinding: Element) -> Self {
        Self {
            amount,
            keypair,
            blinding,
            leaf_index: None,
        }
    }

    /// A zero-amount UTXO under a fresh random keypair
    ///
    /// Fills unused output slots; on the wire its commitment and metadata
    /// ciphertext are indistinguishable from a funded note's.
    pub fn padding<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        Self::new(0, Keypair::generate(rng), rng)
    }

    /// The hidden amount
    #[must_use]
    pub fn amount(&self) -> u128 {
        self.amount
    }

    /// The blinding factor
    #[must_use]
    pub fn blinding(&self) -> Element {
        self.blinding
    }

    /// The owning keypair
    #[must_use]
    pub fn keypair(&self) -> &Keypair {
        &self.keypair
    }

    /// The accumulator position, once accepted
    #[must_use]
    pub fn leaf_index(&self) -> Option<u64> {
        self.leaf_index
    }

    /// Record the accumulator position assigned at acceptance
    pub fn set_leaf_index(&mut self, index: u64) {
        self.leaf_index = Some(index);
    }

    /// The public commitment, `poseidon(amount, public_key, blinding)`
    ///
    /// Deterministic: recomputing with the same fields always gives the
    /// same value, which is what lets a recipient cross-check recovered
    /// metadata against the on-chain leaf.
    #[must_use]
    pub fn commitment(&self) -> Element {
        hash_merge([
            Element::from(self.amount),
            self.keypair.public_key(),
            self.blinding,
        ])
    }

    /// The nullifier, `poseidon(commitment, leaf_index, sig)`
    ///
    /// # Errors
    ///
    /// [`NotInserted`] if the UTXO has no leaf index yet; an output that
    /// was never accepted cannot be spent.
    pub fn nullifier(&self) -> Result<Element, NotInserted> {
        let index = self.leaf_index.ok_or(NotInserted)?;
        let commitment = self.commitment();
        let signature = self.keypair.sign(commitment, index);

        Ok(hash_merge([commitment, Element::from(index), signature]))
    }

    /// Encrypt this UTXO's hidden fields to its owner's address
    ///
    /// Published alongside the transaction so the recipient can recover
    /// the UTXO from public data alone.
    #[must_use]
    pub fn encrypt_metadata<R: RngCore + CryptoRng>(&self, rng: &mut R) -> Vec<u8> {
        let plaintext = NotePlaintext {
            amount: self.amount,
            blinding: self.blinding,
        };
        let bytes = borsh::to_vec(&plaintext).expect("note serialization is infallible");

        self.keypair.address().encrypt(&bytes, rng)
    }

    /// Recover a UTXO from published metadata
    ///
    /// `leaf_index` is the accumulator position the commitment landed at.
    /// The caller should verify `utxo.commitment()` against the leaf at
    /// that position before trusting the result.
    ///
    /// # Errors
    ///
    /// [`CryptoError::Decryption`] when the ciphertext belongs to someone
    /// else.
    pub fn decrypt_metadata(
        keypair: &Keypair,
        leaf_index: u64,
        ciphertext: &[u8],
    ) -> Result<Self, CryptoError> {
        let bytes = keypair.decrypt(ciphertext)?;
        let plaintext =
            NotePlaintext::try_from_slice(&bytes).map_err(|_| CryptoError::Malformed)?;

        Ok(Self {
            amount: plaintext.amount,
            keypair: keypair.clone(),
            blinding: plaintext.blinding,
            leaf_index: Some(leaf_index),
        })
    }
}

#[cfg(test)]
mod tests {
    use rand_chacha::{rand_core::SeedableRng, ChaChaRng};

    use super::*;

    fn rng() -> ChaChaRng {
        ChaChaRng::from_seed([4; 32])
    }

    #[test]
    fn commitment_is_deterministic() {
        let mut rng = rng();
        let keypair = Keypair::generate(&mut rng);
        let utxo = Utxo::new(100, keypair.clone(), &mut rng);

        let same = Utxo::new_with_blinding(100, keypair, utxo.blinding());
        assert_eq!(utxo.commitment(), same.commitment());
    }

    #[test]
    fn equal_amounts_with_different_blindings_are_unlinkable() {
        let mut rng = rng();
        let keypair = Keypair::generate(&mut rng);

        let mut a = Utxo::new(100, keypair.clone(), &mut rng);
        let mut b = Utxo::new(100, keypair, &mut rng);
        assert_ne!(a.commitment(), b.commitment());

        a.set_leaf_index(0);
        b.set_leaf_index(1);
        assert_ne!(a.nullifier().unwrap(), b.nullifier().unwrap());
    }

    #[test]
    fn nullifier_requires_a_leaf_index() {
        let mut rng = rng();
        let utxo = Utxo::new(5, Keypair::generate(&mut rng), &mut rng);

        assert_eq!(utxo.nullifier().unwrap_err(), NotInserted);
    }

    #[test]
    fn spending_the_same_utxo_twice_yields_the_same_nullifier() {
        let mut rng = rng();
        let mut utxo = Utxo::new(7, Keypair::generate(&mut rng), &mut rng);
        utxo.set_leaf_index(3);

        assert_eq!(utxo.nullifier().unwrap(), utxo.nullifier().unwrap());
    }

    #[test]
    fn metadata_round_trips_to_the_owner() {
        let mut rng = rng();
        let keypair = Keypair::generate(&mut rng);
        let mut utxo = Utxo::new(250, keypair.clone(), &mut rng);
        utxo.set_leaf_index(9);

        let ciphertext = utxo.encrypt_metadata(&mut rng);
        let recovered = Utxo::decrypt_metadata(&keypair, 9, &ciphertext).unwrap();

        assert_eq!(recovered.amount(), 250);
        assert_eq!(recovered.blinding(), utxo.blinding());
        assert_eq!(recovered.leaf_index(), Some(9));

        // the recovered record reproduces the on-chain commitment and can spend
        assert_eq!(recovered.commitment(), utxo.commitment());
        assert_eq!(recovered.nullifier().unwrap(), utxo.nullifier().unwrap());
    }

    #[test]
    fn metadata_is_opaque_to_others() {
        let mut rng = rng();
        let alice = Keypair::generate(&mut rng);
        let bob = Keypair::generate(&mut rng);

        let utxo = Utxo::new(11, alice, &mut rng);
        let ciphertext = utxo.encrypt_metadata(&mut rng);

        assert_eq!(
            Utxo::decrypt_metadata(&bob, 0, &ciphertext).unwrap_err(),
            CryptoError::Decryption
        );
    }
}
