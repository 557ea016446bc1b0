//! Shared helpers for the end-to-end pool scenarios
//!
//! The scenarios need a fungible token to move around publicly;
//! [`TokenLedger`] is that token, an in-memory balance map where the
//! pool, the bridge, relayers, and users are all plain [`Account`]s.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use rand_chacha::{rand_core::SeedableRng, ChaChaRng};
use shield::{Account, HashProver};
use shielded_pool::{CustodyError, Pool, PoolConfig, TokenCustody};

/// An in-memory fungible token ledger; clone = handle
#[derive(Debug, Clone, Default)]
pub struct TokenLedger {
    balances: Arc<Mutex<HashMap<Account, u128>>>,
}

impl TokenLedger {
    /// An empty ledger
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create `amount` tokens on `to`
    pub fn mint(&self, to: Account, amount: u128) {
        *self.balances.lock().entry(to).or_default() += amount;
    }

    /// Move `amount` tokens from `from` to `to`
    ///
    /// # Errors
    ///
    /// [`CustodyError`] when `from` cannot cover the amount; no balance
    /// changes.
    pub fn transfer(&self, from: Account, to: Account, amount: u128) -> Result<(), CustodyError> {
        let mut balances = self.balances.lock();

        let available = balances.get(&from).copied().unwrap_or(0);
        if available < amount {
            return Err(CustodyError {
                account: from,
                available,
                required: amount,
            });
        }

        *balances.get_mut(&from).expect("checked above") -= amount;
        *balances.entry(to).or_default() += amount;
        Ok(())
    }

    /// The balance of `account`
    #[must_use]
    pub fn balance_of(&self, account: Account) -> u128 {
        self.balances.lock().get(&account).copied().unwrap_or(0)
    }

    /// The sum of all balances; conservation checks compare this across a
    /// scenario
    #[must_use]
    pub fn total_supply(&self) -> u128 {
        self.balances.lock().values().sum()
    }
}

/// [`TokenCustody`] over a [`TokenLedger`]
///
/// The pool's holdings live on `pool`; an L1-bound withdrawal lands on
/// `bridge`, standing in for delivery on the other settlement layer.
#[derive(Debug, Clone)]
pub struct LedgerCustody {
    ledger: TokenLedger,
    pool: Account,
    bridge: Account,
}

impl TokenCustody for LedgerCustody {
    fn collect(&self, from: Account, amount: u128) -> Result<(), CustodyError> {
        self.ledger.transfer(from, self.pool, amount)
    }

    fn disburse(&self, to: Account, amount: u128) -> Result<(), CustodyError> {
        self.ledger.transfer(self.pool, to, amount)
    }

    fn bridge_out(&self, _recipient: Account, amount: u128) -> Result<(), CustodyError> {
        self.ledger.transfer(self.pool, self.bridge, amount)
    }
}

/// A pool wired to a fresh ledger, with the custody accounts exposed
pub struct Harness<const DEPTH: usize> {
    /// The pool under test, backed by [`HashProver`]
    pub pool: Pool<DEPTH>,
    /// The public token ledger
    pub ledger: TokenLedger,
    /// The account holding the pool's public tokens
    pub pool_account: Account,
    /// The account standing in for the bridge on this layer
    pub bridge_account: Account,
}

impl<const DEPTH: usize> Harness<DEPTH> {
    /// A pool under the given policy, with empty ledger balances
    #[must_use]
    pub fn new(config: PoolConfig) -> Self {
        let ledger = TokenLedger::new();
        let pool_account = Account::from_label("pool");
        let bridge_account = Account::from_label("bridge");

        let custody = LedgerCustody {
            ledger: ledger.clone(),
            pool: pool_account,
            bridge: bridge_account,
        };
        let pool = Pool::new(config, Arc::new(HashProver), Arc::new(custody));

        Self {
            pool,
            ledger,
            pool_account,
            bridge_account,
        }
    }

    /// A pool with the default policy
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(PoolConfig::default())
    }
}

/// A deterministic rng for reproducible scenarios
#[must_use]
pub fn rng(seed: u8) -> ChaChaRng {
    ChaChaRng::from_seed([seed; 32])
}

/// Route `tracing` output through the test harness, once per process
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
