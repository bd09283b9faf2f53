//! Claim Processing
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    CLAIM SYSTEM                             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  campaign.rs - Claim entry point: verify, record, issue     │
//! │  ledger.rs   - Per-identity exactly-once claim state        │
//! │  reward.rs   - Reward issuance boundary                     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Claims for different identities never contend; claims for the same
//! identity are serialized, and at most one of them issues a reward.

pub mod campaign;
pub mod ledger;
pub mod reward;

// Re-export key types
pub use campaign::{
    Campaign, CampaignParams, ClaimRequest, ClaimResponse, ClaimSnapshot, SnapshotError,
};
pub use ledger::{ClaimError, ClaimLedger, ClaimReceipt, ClaimState, MalformedInput};
pub use reward::{Amount, IssuanceError, PoolRewardLedger, RewardLedger};
