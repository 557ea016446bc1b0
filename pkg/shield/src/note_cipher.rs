//! Asymmetric note-metadata encryption
//!
//! Ephemeral x25519 ECDH into ChaCha20-Poly1305, with a blake3 KDF over the
//! shared secret and the ephemeral public key. Wire format:
//! `ephemeral_pk (32) || nonce (12) || ciphertext + tag`.

use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Nonce,
};
use rand::{CryptoRng, RngCore};
use x25519_dalek::{EphemeralSecret, PublicKey, StaticSecret};

use crate::CryptoError;

/// Domain separator for the AEAD key derivation
const AEAD_KEY_DOMAIN: &str = "shield.v1.note-aead";

const EPHEMERAL_LEN: usize = 32;
const NONCE_LEN: usize = 12;

/// Encrypt `plaintext` to the holder of `recipient_key`
pub(crate) fn seal<R: RngCore + CryptoRng>(
    recipient_key: &[u8; 32],
    plaintext: &[u8],
    rng: &mut R,
) -> Vec<u8> {
    let ephemeral_secret = EphemeralSecret::random_from_rng(&mut *rng);
    let ephemeral_public = PublicKey::from(&ephemeral_secret);

    let shared = ephemeral_secret.diffie_hellman(&PublicKey::from(*recipient_key));
    let key = derive_aead_key(shared.as_bytes(), ephemeral_public.as_bytes());

    let mut nonce = [0u8; NONCE_LEN];
    rng.fill_bytes(&mut nonce);

    let cipher = ChaCha20Poly1305::new_from_slice(&key).expect("key is 32 bytes");
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), plaintext)
        .expect("chacha20poly1305 encryption is infallible");

    let mut out = Vec::with_capacity(EPHEMERAL_LEN + NONCE_LEN + ciphertext.len());
    out.extend_from_slice(ephemeral_public.as_bytes());
    out.extend_from_slice(&nonce);
    out.extend_from_slice(&ciphertext);
    out
}

/// Decrypt a sealed payload with the recipient's x25519 secret
pub(crate) fn open(secret: &StaticSecret, bytes: &[u8]) -> Result<Vec<u8>, CryptoError> {
    if bytes.len() < EPHEMERAL_LEN + NONCE_LEN {
        return Err(CryptoError::Malformed);
    }

    let (ephemeral, rest) = bytes.split_at(EPHEMERAL_LEN);
    let (nonce, ciphertext) = rest.split_at(NONCE_LEN);

    let ephemeral: [u8; 32] = ephemeral.try_into().expect("split at 32");
    let shared = secret.diffie_hellman(&PublicKey::from(ephemeral));
    let key = derive_aead_key(shared.as_bytes(), &ephemeral);

    let cipher = ChaCha20Poly1305::new_from_slice(&key).expect("key is 32 bytes");
    cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| CryptoError::Decryption)
}

fn derive_aead_key(shared_secret: &[u8], ephemeral_public: &[u8]) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new_derive_key(AEAD_KEY_DOMAIN);
    hasher.update(shared_secret);
    hasher.update(ephemeral_public);
    *hasher.finalize().as_bytes()
}
