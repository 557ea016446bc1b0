use serde::{Deserialize, Serialize};

/// One whole token, in base units
pub const UNIT: u128 = 1_000_000_000_000_000_000;

/// Pool policy knobs
///
/// The accumulator depth is not here: it is a const generic on
/// [`Pool`](crate::Pool), fixed at compile time like the circuits that
/// prove against it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PoolConfig {
    /// How many recent roots stay valid for proofs
    pub root_history_size: usize,
    /// Withdrawals below this are rejected with `WithdrawalTooSmall`
    pub minimum_withdrawal_amount: u128,
    /// Deposits above this are rejected with `DepositTooLarge`
    pub maximum_deposit_amount: u128,
    /// How many times the assembler re-prepares after `StaleRoot`
    pub stale_root_retries: u32,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            root_history_size: 30,
            minimum_withdrawal_amount: UNIT / 20,
            maximum_deposit_amount: UNIT,
            stale_root_retries: 3,
        }
    }
}

impl PoolConfig {
    /// Parse a config from TOML; absent keys take their defaults
    ///
    /// # Errors
    ///
    /// Returns the TOML error for syntax errors or unknown keys.
    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }
}
