use thiserror::Error;

/// Failures in note-metadata encryption
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// The ciphertext was not encrypted for this keypair
    ///
    /// Expected and benign when scanning all published transactions for the
    /// ones you own; callers should skip and move on.
    #[error("ciphertext was not addressed to this keypair")]
    Decryption,

    /// The ciphertext is too short to contain the wire header
    #[error("malformed note ciphertext")]
    Malformed,
}

/// The UTXO has no accumulator position yet
///
/// Nullifiers are derived from the leaf index, so a not-yet-accepted output
/// cannot produce one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("utxo has not been inserted into the tree, so it has no leaf index")]
pub struct NotInserted;
