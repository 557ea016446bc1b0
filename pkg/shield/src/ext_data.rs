use std::fmt::{self, Debug, Display};
use std::str::FromStr;

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use zk_primitives::Element;

/// A 20-byte public account on the token ledger
///
/// Used for withdrawal recipients, relayers, and the pool/bridge custody
/// accounts. This is deliberately not a [`ShieldedAddress`]: anything paid
/// to an `Account` is public value.
///
/// [`ShieldedAddress`]: crate::ShieldedAddress
#[derive(
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    BorshSerialize,
    BorshDeserialize,
)]
#[serde(transparent)]
pub struct Account(#[serde(with = "hex::serde")] pub [u8; 20]);

impl Account {
    /// The all-zero account, used when a transaction has no public recipient
    pub const ZERO: Self = Self([0; 20]);

    /// Derive a test/display-friendly account from a label
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        let mut bytes = [0u8; 20];
        let digest = Keccak256::digest(label.as_bytes());
        bytes.copy_from_slice(&digest[..20]);
        Self(bytes)
    }
}

impl Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

impl FromStr for Account {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let mut bytes = [0u8; 20];
        hex::decode_to_slice(s, &mut bytes)?;
        Ok(Self(bytes))
    }
}

/// The public context of a transaction, bound into the proof
///
/// Everything here is visible on the wire. The keccak digest of the borsh
/// encoding is one of the proof's public signals, so none of these fields
/// can be altered after proving; in particular `is_l1_withdrawal`, which
/// downstream bridge routing trusts precisely because it is proof-bound
/// rather than caller-supplied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct ExtData {
    /// Where public value goes on withdrawal (ignored for deposits)
    pub recipient: Account,
    /// The external amount: positive for a deposit, negative for a
    /// withdrawal, zero for a fully shielded transfer
    pub ext_amount: i128,
    /// The account paid the fee for relaying this transaction
    pub relayer: Account,
    /// Fee paid out of the public leg
    pub fee: u128,
    /// Note metadata encrypted to each output's owner, in output order
    pub encrypted_outputs: Vec<Vec<u8>>,
    /// Route a withdrawal to the other settlement layer via the bridge
    pub is_l1_withdrawal: bool,
}

impl ExtData {
    /// The field-sized digest bound into the public signals
    #[must_use]
    pub fn hash(&self) -> Element {
        let bytes = borsh::to_vec(self).expect("ext data serialization is infallible");
        let digest: [u8; 32] = Keccak256::digest(&bytes).into();

        let mut element = Element::from_be_bytes(digest);
        element.canonicalize();
        element
    }

    /// The signed public amount the balance check uses:
    /// `ext_amount - fee`, embedded into the field
    #[must_use]
    pub fn public_amount(&self) -> Element {
        let fee = i128::try_from(self.fee).expect("fee fits in i128");
        Element::from_i128(self.ext_amount - fee)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ext_data() -> ExtData {
        ExtData {
            recipient: Account::from_label("recipient"),
            ext_amount: -80,
            relayer: Account::ZERO,
            fee: 0,
            encrypted_outputs: vec![vec![1, 2, 3]],
            is_l1_withdrawal: false,
        }
    }

    #[test]
    fn hash_commits_to_every_field() {
        let base = ext_data();

        let mut flagged = base.clone();
        flagged.is_l1_withdrawal = true;
        assert_ne!(base.hash(), flagged.hash());

        let mut rerouted = base.clone();
        rerouted.recipient = Account::from_label("attacker");
        assert_ne!(base.hash(), rerouted.hash());

        assert_eq!(base.hash(), ext_data().hash());
        assert!(base.hash().is_canonical());
    }

    #[test]
    fn public_amount_subtracts_the_fee() {
        let deposit = ExtData {
            ext_amount: 100,
            fee: 10,
            ..ext_data()
        };
        assert_eq!(deposit.public_amount(), Element::new(90));

        let withdrawal = ExtData {
            ext_amount: -80,
            fee: 10,
            ..ext_data()
        };
        assert_eq!(withdrawal.public_amount(), Element::from_i128(-90));
    }

    #[test]
    fn account_round_trips_through_display() {
        let account = Account::from_label("alice");
        let parsed: Account = account.to_string().parse().unwrap();
        assert_eq!(parsed, account);
    }
}
