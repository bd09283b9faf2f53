//! Claim Ledger
//!
//! Per-identity claim state: `Unclaimed` (implicit) → `Claimed` (terminal).
//! Each identity gets its own async mutex, so claims for different
//! identities run in parallel while claims for the same identity are
//! serialized through one check-then-set.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};

use crate::claim::reward::{Amount, IssuanceError};
use crate::core::identity::{Identity, IdentityError};
use crate::proof::merkle::ProofDecodeError;

/// Proof of a completed claim.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimReceipt {
    /// Who claimed.
    pub identity: Identity,
    /// Amount issued.
    pub amount: Amount,
    /// When the claim was recorded.
    pub claimed_at: DateTime<Utc>,
}

/// Claim state of one identity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClaimState {
    /// Never claimed (the state of every identity not in the ledger).
    Unclaimed,
    /// Claimed; terminal.
    Claimed(ClaimReceipt),
}

impl ClaimState {
    /// Has the reward been disbursed?
    pub fn is_claimed(&self) -> bool {
        matches!(self, Self::Claimed(_))
    }
}

/// Why a claim was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClaimError {
    /// Proof does not lead to the campaign root.
    #[error("incorrect merkle proof")]
    InvalidProof,

    /// Identity already received its reward.
    #[error("already claimed")]
    AlreadyClaimed,

    /// Identity or proof failed shape validation.
    #[error("malformed input: {0}")]
    MalformedInput(#[from] MalformedInput),

    /// The reward ledger failed; the claim was not recorded.
    #[error("reward issuance failed: {0}")]
    IssuanceFailure(#[from] IssuanceError),
}

impl ClaimError {
    /// Stable machine-readable reason.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::InvalidProof => "invalid_proof",
            Self::AlreadyClaimed => "already_claimed",
            Self::MalformedInput(_) => "malformed_input",
            Self::IssuanceFailure(_) => "issuance_failure",
        }
    }

    /// Can the same request succeed later?
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::IssuanceFailure(_))
    }
}

/// Shape validation failures, caught before any hashing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedInput {
    /// Identity is not a canonical 20-byte value.
    #[error(transparent)]
    Identity(#[from] IdentityError),
    /// Proof is not a sequence of 32-byte hashes.
    #[error(transparent)]
    Proof(#[from] ProofDecodeError),
}

type Slot = Arc<Mutex<ClaimState>>;

/// Keyed store of claim states.
///
/// Only identities that passed proof verification ever get a slot.
#[derive(Debug, Default)]
pub struct ClaimLedger {
    slots: RwLock<BTreeMap<Identity, Slot>>,
}

impl ClaimLedger {
    /// Empty ledger: every identity is `Unclaimed`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a ledger from recorded receipts.
    pub fn from_receipts<I>(receipts: I) -> Self
    where
        I: IntoIterator<Item = ClaimReceipt>,
    {
        let slots = receipts
            .into_iter()
            .map(|r| (r.identity, Arc::new(Mutex::new(ClaimState::Claimed(r)))))
            .collect();
        Self {
            slots: RwLock::new(slots),
        }
    }

    /// Current state of an identity.
    pub async fn state(&self, identity: &Identity) -> ClaimState {
        match self.existing_slot(identity).await {
            Some(slot) => slot.lock().await.clone(),
            None => ClaimState::Unclaimed,
        }
    }

    /// Has this identity claimed?
    pub async fn is_claimed(&self, identity: &Identity) -> bool {
        self.state(identity).await.is_claimed()
    }

    /// Run the `Unclaimed → Claimed` transition.
    ///
    /// Under the identity's lock: fail with `AlreadyClaimed` if claimed;
    /// otherwise call `issue`, and only if it succeeds record the receipt.
    /// A failed issuance leaves the identity `Unclaimed`.
    pub async fn record<F>(
        &self,
        identity: Identity,
        amount: Amount,
        issue: F,
    ) -> Result<ClaimReceipt, ClaimError>
    where
        F: FnOnce() -> Result<(), IssuanceError>,
    {
        let slot = self.slot(identity).await;
        let mut state = slot.lock().await;

        if state.is_claimed() {
            return Err(ClaimError::AlreadyClaimed);
        }

        issue()?;

        let receipt = ClaimReceipt {
            identity,
            amount,
            claimed_at: Utc::now(),
        };
        *state = ClaimState::Claimed(receipt.clone());
        Ok(receipt)
    }

    /// All receipts, ordered by identity.
    pub async fn receipts(&self) -> Vec<ClaimReceipt> {
        let slots: Vec<Slot> = self.slots.read().await.values().cloned().collect();

        let mut receipts = Vec::with_capacity(slots.len());
        for slot in slots {
            if let ClaimState::Claimed(receipt) = &*slot.lock().await {
                receipts.push(receipt.clone());
            }
        }
        receipts
    }

    /// Number of claimed identities.
    pub async fn claimed_count(&self) -> usize {
        self.receipts().await.len()
    }

    async fn existing_slot(&self, identity: &Identity) -> Option<Slot> {
        self.slots.read().await.get(identity).cloned()
    }

    /// Get or create the slot for an identity.
    async fn slot(&self, identity: Identity) -> Slot {
        if let Some(slot) = self.existing_slot(&identity).await {
            return slot;
        }

        let mut slots = self.slots.write().await;
        slots
            .entry(identity)
            .or_insert_with(|| Arc::new(Mutex::new(ClaimState::Unclaimed)))
            .clone()
    }
}
