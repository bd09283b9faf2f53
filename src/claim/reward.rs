//! Reward Issuance Boundary
//!
//! The ledger that actually holds and moves value lives outside this crate.
//! [`RewardLedger`] is the seam; [`PoolRewardLedger`] is an in-memory pool
//! used by the demo binary and tests.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tracing::debug;

use crate::core::identity::Identity;

/// Reward amount in base units.
pub type Amount = u128;

/// External reward issuance.
///
/// Called at most once per identity, while the claim ledger holds that
/// identity's lock. Returning `Err` must mean nothing was issued.
pub trait RewardLedger: Send + Sync {
    /// Credit `amount` to `identity`.
    fn issue(&self, identity: &Identity, amount: Amount) -> Result<(), IssuanceError>;
}

/// Errors from the reward ledger.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IssuanceError {
    /// Pool cannot cover the reward.
    #[error("insufficient pool: requested {requested}, available {available}")]
    InsufficientPool {
        /// Amount asked for.
        requested: Amount,
        /// Amount left in the pool.
        available: Amount,
    },
    /// Ledger refused the transfer.
    #[error("issuance rejected: {0}")]
    Rejected(String),
    /// Ledger could not be reached.
    #[error("reward ledger unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Default)]
struct PoolState {
    pool: Amount,
    balances: BTreeMap<Identity, Amount>,
    issued: usize,
}

/// Finite reward pool with per-identity balances.
#[derive(Debug, Default)]
pub struct PoolRewardLedger {
    state: Mutex<PoolState>,
}

impl PoolRewardLedger {
    /// Pool holding `pool` base units.
    pub fn with_pool(pool: Amount) -> Self {
        Self {
            state: Mutex::new(PoolState {
                pool,
                ..Default::default()
            }),
        }
    }

    /// Balance credited to an identity (0 if never paid).
    pub fn balance_of(&self, identity: &Identity) -> Amount {
        self.read().balances.get(identity).copied().unwrap_or(0)
    }

    /// Amount left in the pool.
    pub fn remaining(&self) -> Amount {
        self.read().pool
    }

    /// Number of successful issuances.
    pub fn issued_count(&self) -> usize {
        self.read().issued
    }

    /// Lock for reading, recovering from poisoning.
    fn read(&self) -> MutexGuard<'_, PoolState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl RewardLedger for PoolRewardLedger {
    fn issue(&self, identity: &Identity, amount: Amount) -> Result<(), IssuanceError> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| IssuanceError::Unavailable("pool lock poisoned".to_string()))?;

        if state.pool < amount {
            return Err(IssuanceError::InsufficientPool {
                requested: amount,
                available: state.pool,
            });
        }

        state.pool -= amount;
        *state.balances.entry(*identity).or_insert(0) += amount;
        state.issued += 1;

        debug!("Issued {} to {}", amount, identity);
        Ok(())
    }
}
