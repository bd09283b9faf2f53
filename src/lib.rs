//! # Merkle Airdrop
//!
//! Fixed-amount token distribution to a precomputed set of identities,
//! committed to as a single Merkle root and claimed exactly once per identity.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    MERKLE AIRDROP                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Primitives                               │
//! │  ├── hash.rs     - Keccak-256 / SHA-256, sorted pair hash   │
//! │  └── identity.rs - 20-byte claimant identity                │
//! │                                                             │
//! │  proof/          - Commitment (pure)                        │
//! │  ├── leaf.rs     - Identity -> leaf hash                    │
//! │  ├── merkle.rs   - Tree builder and prover                  │
//! │  ├── verify.rs   - Proof verifier                           │
//! │  └── bundle.rs   - Published hex proofs                     │
//! │                                                             │
//! │  claim/          - Claim processing (stateful)              │
//! │  ├── campaign.rs - Verify, record, issue                    │
//! │  ├── ledger.rs   - Exactly-once claim state                 │
//! │  └── reward.rs   - Reward issuance boundary                 │
//! │                                                             │
//! │  eligibility.rs  - Action log -> eligible set               │
//! │  config.rs       - Environment configuration                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Commitment
//!
//! Leaves are `H(identity)`, sorted and de-duplicated; parents are
//! `H(min(a, b) || max(a, b))`; an odd node moves up unchanged. The root
//! depends only on the set of identities, never on input order, and proofs
//! need no left/right flags.
//!
//! The `proof/` modules are pure: the same inputs give the same root and
//! the same verdict on any machine. All mutable state lives in `claim/`.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod claim;
pub mod config;
pub mod core;
pub mod eligibility;
pub mod proof;

// Re-export commonly used types
pub use claim::{
    Amount, Campaign, CampaignParams, ClaimError, ClaimReceipt, ClaimRequest, ClaimResponse,
    PoolRewardLedger, RewardLedger,
};
pub use config::AirdropConfig;
pub use core::{Hash32, HashAlgorithm, Identity};
pub use eligibility::{collect_eligible, EligibilityWindow, QualifyingAction};
pub use proof::{MerkleProof, MerkleTree, ProofBundle};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
