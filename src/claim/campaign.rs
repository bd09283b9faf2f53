//! Airdrop Campaign
//!
//! Binds a published root and reward amount to a claim ledger and an
//! external reward ledger. [`Campaign::claim`] is the only way claim state
//! ever changes.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::claim::ledger::{ClaimError, ClaimLedger, ClaimReceipt, MalformedInput};
use crate::claim::reward::{Amount, RewardLedger};
use crate::core::hash::{self, Hash32, HashAlgorithm};
use crate::core::identity::Identity;
use crate::proof::merkle::{MerkleProof, MerkleTree};
use crate::proof::verify::ProofVerifier;

/// Public, immutable campaign parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignParams {
    /// Campaign identifier.
    pub id: Uuid,
    /// Root of the eligible-set tree.
    #[serde(with = "hash::hex_hash")]
    pub root: Hash32,
    /// Hash algorithm of the tree.
    pub algorithm: HashAlgorithm,
    /// Fixed reward per identity (base units).
    pub reward_amount: Amount,
}

impl CampaignParams {
    /// Parameters for a freshly built tree.
    pub fn for_tree(tree: &MerkleTree, reward_amount: Amount) -> Self {
        Self {
            id: Uuid::new_v4(),
            root: tree.root(),
            algorithm: tree.algorithm(),
            reward_amount,
        }
    }

    /// Serialize as pretty JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Claim request as it arrives from outside: hex text, unvalidated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimRequest {
    /// Claiming identity (hex).
    pub identity: String,
    /// Proof siblings (hex).
    pub proof: Vec<String>,
}

impl ClaimRequest {
    /// Validate shape and convert to typed values. No hashing happens here.
    pub fn parse(&self) -> Result<(Identity, MerkleProof), MalformedInput> {
        let identity = Identity::parse(&self.identity)?;
        let proof = MerkleProof::from_hex(&self.proof)?;
        Ok((identity, proof))
    }
}

/// Claim outcome as reported back to the claimant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ClaimResponse {
    /// Reward issued.
    Claimed {
        /// Issued receipt.
        receipt: ClaimReceipt,
    },
    /// Claim refused.
    Rejected {
        /// Machine-readable reason.
        reason: String,
        /// Human-readable detail.
        message: String,
        /// Whether retrying can help.
        retryable: bool,
    },
}

impl From<Result<ClaimReceipt, ClaimError>> for ClaimResponse {
    fn from(result: Result<ClaimReceipt, ClaimError>) -> Self {
        match result {
            Ok(receipt) => Self::Claimed { receipt },
            Err(err) => Self::Rejected {
                reason: err.reason().to_string(),
                message: err.to_string(),
                retryable: err.is_retryable(),
            },
        }
    }
}

/// Snapshot of claim state, tied to one campaign.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimSnapshot {
    /// Campaign this state belongs to.
    pub campaign_id: Uuid,
    /// Root of that campaign.
    pub root: Hash32,
    /// Hash algorithm of that campaign.
    pub algorithm: HashAlgorithm,
    /// Reward every recorded claim was paid.
    pub reward_amount: Amount,
    /// Completed claims.
    pub claims: Vec<ClaimReceipt>,
}

impl ClaimSnapshot {
    /// Serialize to binary.
    pub fn to_bytes(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }

    /// Deserialize from binary.
    pub fn from_bytes(data: &[u8]) -> Result<Self, bincode::Error> {
        bincode::deserialize(data)
    }

    /// Parameters of the campaign this state belongs to.
    pub fn params(&self) -> CampaignParams {
        CampaignParams {
            id: self.campaign_id,
            root: self.root,
            algorithm: self.algorithm,
            reward_amount: self.reward_amount,
        }
    }
}

/// Snapshot does not belong to this campaign.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotError {
    /// Different campaign id.
    #[error("snapshot is for campaign {found}, expected {expected}")]
    CampaignMismatch {
        /// This campaign.
        expected: Uuid,
        /// Snapshot's campaign.
        found: Uuid,
    },
    /// Same id but a different root.
    #[error("snapshot root does not match campaign root")]
    RootMismatch,
    /// Same id and root but a different reward or hash algorithm.
    #[error("snapshot {field} does not match campaign {field}")]
    ParamsMismatch {
        /// Which parameter differs.
        field: &'static str,
    },
}

/// A live airdrop campaign.
pub struct Campaign {
    params: CampaignParams,
    verifier: ProofVerifier,
    ledger: ClaimLedger,
    rewards: Arc<dyn RewardLedger>,
}

impl std::fmt::Debug for Campaign {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Campaign")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

impl Campaign {
    /// Start a campaign over a built tree.
    pub fn new(tree: &MerkleTree, reward_amount: Amount, rewards: Arc<dyn RewardLedger>) -> Self {
        Self::from_params(CampaignParams::for_tree(tree, reward_amount), rewards)
    }

    /// Start (or resume, with an empty ledger) from published parameters.
    pub fn from_params(params: CampaignParams, rewards: Arc<dyn RewardLedger>) -> Self {
        info!(
            "Campaign {} opened: root {}, reward {}",
            params.id,
            hash::to_hex(&params.root),
            params.reward_amount
        );
        Self {
            verifier: ProofVerifier::new(params.algorithm, params.root),
            params,
            ledger: ClaimLedger::new(),
            rewards,
        }
    }

    /// Resume from published parameters and a claim snapshot.
    pub fn restore(
        params: CampaignParams,
        snapshot: ClaimSnapshot,
        rewards: Arc<dyn RewardLedger>,
    ) -> Result<Self, SnapshotError> {
        if snapshot.campaign_id != params.id {
            return Err(SnapshotError::CampaignMismatch {
                expected: params.id,
                found: snapshot.campaign_id,
            });
        }
        if snapshot.root != params.root {
            return Err(SnapshotError::RootMismatch);
        }
        // Reward is fixed for the campaign's lifetime.
        if snapshot.reward_amount != params.reward_amount {
            return Err(SnapshotError::ParamsMismatch {
                field: "reward amount",
            });
        }
        if snapshot.algorithm != params.algorithm {
            return Err(SnapshotError::ParamsMismatch { field: "algorithm" });
        }

        info!(
            "Campaign {} restored with {} claims",
            params.id,
            snapshot.claims.len()
        );
        Ok(Self {
            verifier: ProofVerifier::new(params.algorithm, params.root),
            params,
            ledger: ClaimLedger::from_receipts(snapshot.claims),
            rewards,
        })
    }

    /// Open a campaign over `params`, resuming from `snapshot` if given.
    ///
    /// A snapshot keeps its own campaign id; its root, algorithm and reward
    /// must match `params`, otherwise nothing is opened.
    pub fn open(
        params: CampaignParams,
        snapshot: Option<ClaimSnapshot>,
        rewards: Arc<dyn RewardLedger>,
    ) -> Result<Self, SnapshotError> {
        match snapshot {
            Some(snapshot) => {
                let params = CampaignParams {
                    id: snapshot.campaign_id,
                    ..params
                };
                Self::restore(params, snapshot, rewards)
            }
            None => Ok(Self::from_params(params, rewards)),
        }
    }

    /// Published parameters.
    pub fn params(&self) -> &CampaignParams {
        &self.params
    }

    /// Published root.
    pub fn root(&self) -> Hash32 {
        self.params.root
    }

    /// Fixed reward per identity.
    pub fn reward_amount(&self) -> Amount {
        self.params.reward_amount
    }

    /// Check eligibility without claiming.
    pub fn verify(&self, identity: &Identity, proof: &MerkleProof) -> bool {
        self.verifier.verify(identity, proof)
    }

    /// Claim the reward for `identity`.
    #[instrument(skip_all, fields(campaign = %self.params.id, identity = %identity))]
    pub async fn claim(
        &self,
        identity: Identity,
        proof: &MerkleProof,
    ) -> Result<ClaimReceipt, ClaimError> {
        if self.ledger.is_claimed(&identity).await {
            debug!("Rejected: already claimed");
            return Err(ClaimError::AlreadyClaimed);
        }

        if !self.verifier.verify(&identity, proof) {
            debug!("Rejected: proof does not reach root");
            return Err(ClaimError::InvalidProof);
        }

        let amount = self.params.reward_amount;
        let rewards = &self.rewards;
        let result = self
            .ledger
            .record(identity, amount, || rewards.issue(&identity, amount))
            .await;

        match &result {
            Ok(_) => info!("Claimed {} for {}", amount, identity),
            Err(ClaimError::IssuanceFailure(err)) => warn!("Issuance failed for {}: {}", identity, err),
            Err(err) => debug!("Rejected: {}", err),
        }
        result
    }

    /// Claim from an unvalidated request.
    pub async fn submit(&self, request: &ClaimRequest) -> Result<ClaimReceipt, ClaimError> {
        let (identity, proof) = request.parse().map_err(|err| {
            debug!("Rejected malformed request: {}", err);
            ClaimError::MalformedInput(err)
        })?;
        self.claim(identity, &proof).await
    }

    /// Has this identity claimed?
    pub async fn is_claimed(&self, identity: &Identity) -> bool {
        self.ledger.is_claimed(identity).await
    }

    /// Number of completed claims.
    pub async fn claimed_count(&self) -> usize {
        self.ledger.claimed_count().await
    }

    /// Snapshot of the claim state.
    pub async fn snapshot(&self) -> ClaimSnapshot {
        ClaimSnapshot {
            campaign_id: self.params.id,
            root: self.params.root,
            algorithm: self.params.algorithm,
            reward_amount: self.params.reward_amount,
            claims: self.ledger.receipts().await,
        }
    }
}
