use std::fmt::{self, Debug, Display};
use std::str::FromStr;

use rand::{CryptoRng, RngCore};
use x25519_dalek::{PublicKey, StaticSecret};
use zk_primitives::{hash_merge, Element};

use crate::note_cipher;
use crate::CryptoError;

/// Domain separator for deriving the note-encryption secret from a spend key
const ENCRYPTION_KEY_DOMAIN: &str = "shield.v1.encryption-key";

/// `poseidon(spend_key, 0)`, shared with witness validation, which works
/// from raw spend keys rather than full keypairs
pub(crate) fn derive_public_key(spend_key: Element) -> Element {
    hash_merge([spend_key, Element::ZERO])
}

/// The nullifier signature term, `poseidon(spend_key, commitment, index)`
pub(crate) fn sign_with(spend_key: Element, commitment: Element, leaf_index: u64) -> Element {
    hash_merge([spend_key, commitment, Element::from(leaf_index)])
}

/// A spending/viewing key pair
///
/// The spend key is a uniformly random field element and is the only secret:
/// the public key is `poseidon(spend_key, 0)` (one-way), and the x25519
/// secret used to receive encrypted note metadata is derived from the spend
/// key with a domain-separated blake3 KDF, so a keypair is fully recoverable
/// from the spend key alone.
///
/// Keypairs are created client-side on demand; the pool never stores one.
#[derive(Clone)]
pub struct Keypair {
    spend_key: Element,
    encryption_secret: StaticSecret,
}

impl Keypair {
    /// Generate a keypair with a uniformly random spend key
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        Self::from_spend_key(Element::secure_random(rng))
    }

    /// Reconstruct the full keypair from a spend key
    #[must_use]
    pub fn from_spend_key(spend_key: Element) -> Self {
        let mut hasher = blake3::Hasher::new_derive_key(ENCRYPTION_KEY_DOMAIN);
        hasher.update(&spend_key.to_be_bytes());
        let encryption_secret = StaticSecret::from(*hasher.finalize().as_bytes());

        Self {
            spend_key,
            encryption_secret,
        }
    }

    /// The secret spend key
    #[must_use]
    pub fn spend_key(&self) -> Element {
        self.spend_key
    }

    /// The public key, `poseidon(spend_key, 0)`
    ///
    /// Safe to publish; there is no way back to the spend key.
    #[must_use]
    pub fn public_key(&self) -> Element {
        derive_public_key(self.spend_key)
    }

    /// The shielded address other users send to
    #[must_use]
    pub fn address(&self) -> ShieldedAddress {
        ShieldedAddress {
            public_key: self.public_key(),
            encryption_key: *PublicKey::from(&self.encryption_secret).as_bytes(),
        }
    }

    /// The knowledge-of-spend-key term bound into a nullifier
    ///
    /// `poseidon(spend_key, commitment, leaf_index)`: only the key holder
    /// can produce it, and it commits to both the UTXO and its position.
    #[must_use]
    pub fn sign(&self, commitment: Element, leaf_index: u64) -> Element {
        sign_with(self.spend_key, commitment, leaf_index)
    }

    /// Decrypt note metadata addressed to this keypair
    ///
    /// # Errors
    ///
    /// [`CryptoError::Decryption`] when the ciphertext was encrypted for a
    /// different keypair (benign when scanning).
    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        note_cipher::open(&self.encryption_secret, ciphertext)
    }
}

impl Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // never print the spend key
        f.debug_struct("Keypair")
            .field("public_key", &self.public_key())
            .finish_non_exhaustive()
    }
}

/// A public shielded address: the poseidon public key plus the x25519 key
/// that note metadata is encrypted to
///
/// Displayed as 128 hex characters (32 bytes of each key); parseable back
/// with [`FromStr`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShieldedAddress {
    public_key: Element,
    encryption_key: [u8; 32],
}

impl ShieldedAddress {
    /// The owner's public key, as bound into UTXO commitments
    #[must_use]
    pub fn public_key(&self) -> Element {
        self.public_key
    }

    /// Encrypt a payload so that only the address owner can read it
    #[must_use]
    pub fn encrypt<R: RngCore + CryptoRng>(&self, plaintext: &[u8], rng: &mut R) -> Vec<u8> {
        note_cipher::seal(&self.encryption_key, plaintext, rng)
    }
}

impl Display for ShieldedAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}",
            hex::encode(self.public_key.to_be_bytes()),
            hex::encode(self.encryption_key)
        )
    }
}

impl FromStr for ShieldedAddress {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s).map_err(|_| CryptoError::Malformed)?;
        let bytes: [u8; 64] = bytes.try_into().map_err(|_| CryptoError::Malformed)?;

        let mut public_key = [0u8; 32];
        let mut encryption_key = [0u8; 32];
        public_key.copy_from_slice(&bytes[..32]);
        encryption_key.copy_from_slice(&bytes[32..]);

        Ok(Self {
            public_key: Element::from_be_bytes(public_key),
            encryption_key,
        })
    }
}
