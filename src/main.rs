//! Merkle Airdrop
//!
//! Builds the eligible set, publishes the root and proofs, and runs every
//! claim through a campaign backed by an in-memory reward pool.

use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use merkle_airdrop::{
    claim::ClaimSnapshot,
    core::hash,
    eligibility::{collect_eligible, load_actions},
    AirdropConfig, Campaign, CampaignParams, ClaimRequest, ClaimResponse, HashAlgorithm, Identity,
    MerkleTree, PoolRewardLedger, ProofBundle, QualifyingAction, VERSION,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let default_filter = if cfg!(feature = "debug-tracing") {
        "debug"
    } else {
        "info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    info!("Merkle Airdrop v{}", VERSION);

    let config = AirdropConfig::from_env().context("Invalid configuration")?;
    info!(
        "Hash: {}, reward: {}, window: [{}, {}]",
        config.algorithm, config.reward_amount, config.window.from, config.window.cutoff
    );

    run(config).await
}

async fn run(config: AirdropConfig) -> Result<()> {
    // Eligible set
    let actions = match &config.eligibility_file {
        Some(path) => load_actions(path)
            .with_context(|| format!("Failed to load action log {}", path.display()))?,
        None => demo_actions(config.algorithm),
    };
    let eligible = collect_eligible(actions.iter().copied(), config.window)?;
    info!(
        "{} of {} actions qualify, {} eligible identities",
        actions.iter().filter(|a| config.window.contains(a.sequence)).count(),
        actions.len(),
        eligible.len()
    );

    // Commitment
    let tree = MerkleTree::from_identities(config.algorithm, &eligible)
        .context("Cannot build a campaign without eligible identities")?;
    info!("Root: {} (depth {})", hash::to_hex(&tree.root()), tree.depth());

    let rewards = Arc::new(PoolRewardLedger::with_pool(config.pool));
    let campaign = open_campaign(&config, &tree, rewards.clone())?;

    let bundle = ProofBundle::from_tree(&tree, &eligible);
    if let Some(path) = &config.publish_file {
        publish(path, &campaign, &bundle)?;
    }

    // Every action's author tries to claim, twice.
    info!("=== Claiming ===");
    let mut seen = BTreeSet::new();
    for action in &actions {
        if !seen.insert(action.identity) {
            continue;
        }
        let request = ClaimRequest {
            identity: action.identity.to_string(),
            proof: bundle
                .hex_proof(&action.identity)
                .map(<[String]>::to_vec)
                .unwrap_or_default(),
        };

        for attempt in 1..=2 {
            let response = ClaimResponse::from(campaign.submit(&request).await);
            info!(
                "{} (seq {}) attempt {}: {}",
                action.identity.short(),
                action.sequence,
                attempt,
                serde_json::to_string(&response)?
            );
        }
    }

    info!("=== Summary ===");
    info!("Claims recorded: {}", campaign.claimed_count().await);
    info!("Rewards issued: {}", rewards.issued_count());
    info!("Pool remaining: {}", rewards.remaining());

    if let Some(path) = &config.snapshot_file {
        let snapshot = campaign.snapshot().await;
        std::fs::write(path, snapshot.to_bytes()?)
            .with_context(|| format!("Failed to write snapshot {}", path.display()))?;
        info!("Snapshot ({} claims) written to {}", snapshot.claims.len(), path.display());
    }

    Ok(())
}

/// Open a fresh campaign, or resume the one in the snapshot file.
///
/// A snapshot from a different campaign is an error; it is never replaced.
fn open_campaign(
    config: &AirdropConfig,
    tree: &MerkleTree,
    rewards: Arc<PoolRewardLedger>,
) -> Result<Campaign> {
    let params = CampaignParams::for_tree(tree, config.reward_amount);

    let Some(path) = config.snapshot_file.as_deref().filter(|p| p.exists()) else {
        return Ok(Campaign::from_params(params, rewards));
    };

    let data = std::fs::read(path)
        .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
    let snapshot = ClaimSnapshot::from_bytes(&data)
        .with_context(|| format!("Failed to decode snapshot {}", path.display()))?;

    Campaign::open(params, Some(snapshot), rewards).with_context(|| {
        format!(
            "Snapshot {} does not match this campaign; move it aside to start a new one",
            path.display()
        )
    })
}

fn publish(path: &Path, campaign: &Campaign, bundle: &ProofBundle) -> Result<()> {
    let published = serde_json::json!({
        "campaign": campaign.params(),
        "proofs": bundle,
    });
    std::fs::write(path, serde_json::to_string_pretty(&published)?)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!("Published {} proofs to {}", bundle.len(), path.display());
    Ok(())
}

/// Twenty accounts, one purchase each, at positions 2..=21.
fn demo_actions(algorithm: HashAlgorithm) -> Vec<QualifyingAction> {
    (0..20u64)
        .map(|i| {
            let digest = algorithm.hash(&i.to_be_bytes());
            let mut bytes = [0u8; 20];
            bytes.copy_from_slice(&digest[12..]);
            QualifyingAction {
                identity: Identity::new(bytes),
                sequence: i + 2,
            }
        })
        .collect()
}
