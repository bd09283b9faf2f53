//! Proof Distribution
//!
//! Everything a claimant needs, in the hex form wallets and front-ends expect:
//! the root, the hash algorithm and one proof per eligible identity.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::hash::{self, Hash32, HashAlgorithm};
use crate::core::identity::Identity;
use crate::proof::merkle::{MerkleProof, MerkleTree, ProofDecodeError};

/// Published proofs for an eligible set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofBundle {
    /// Root the proofs lead to.
    #[serde(with = "hash::hex_hash")]
    pub root: Hash32,
    /// Hash algorithm used throughout.
    pub algorithm: HashAlgorithm,
    /// Hex proof per identity.
    pub proofs: BTreeMap<Identity, Vec<String>>,
}

impl ProofBundle {
    /// Generate proofs for every identity the tree contains.
    ///
    /// Identities outside the tree are skipped.
    pub fn from_tree<'a, I>(tree: &MerkleTree, identities: I) -> Self
    where
        I: IntoIterator<Item = &'a Identity>,
    {
        let proofs = identities
            .into_iter()
            .filter_map(|id| tree.prove_identity(id).map(|proof| (*id, proof.to_hex())))
            .collect();

        Self {
            root: tree.root(),
            algorithm: tree.algorithm(),
            proofs,
        }
    }

    /// Number of identities with a proof.
    pub fn len(&self) -> usize {
        self.proofs.len()
    }

    /// True if no identity has a proof.
    pub fn is_empty(&self) -> bool {
        self.proofs.is_empty()
    }

    /// Hex proof for one identity.
    pub fn hex_proof(&self, identity: &Identity) -> Option<&[String]> {
        self.proofs.get(identity).map(Vec::as_slice)
    }

    /// Decoded proof for one identity.
    ///
    /// `Ok(None)` if the identity is not in the bundle.
    pub fn proof(&self, identity: &Identity) -> Result<Option<MerkleProof>, ProofDecodeError> {
        self.hex_proof(identity).map(MerkleProof::from_hex).transpose()
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proof::verify::verify;

    #[test]
    fn test_bundle_covers_members_only() {
        let members: Vec<Identity> = (1..=5).map(|i| Identity::new([i; 20])).collect();
        let tree = MerkleTree::from_identities(HashAlgorithm::Keccak256, &members).unwrap();

        let mut asked = members.clone();
        asked.push(Identity::new([42; 20]));
        let bundle = ProofBundle::from_tree(&tree, &asked);

        assert_eq!(bundle.len(), 5);
        assert!(bundle.hex_proof(&Identity::new([42; 20])).is_none());
        assert_eq!(bundle.proof(&Identity::new([42; 20])).unwrap(), None);
    }

    #[test]
    fn test_bundle_json_proofs_verify() {
        let members: Vec<Identity> = (1..=6).map(|i| Identity::new([i; 20])).collect();
        let tree = MerkleTree::from_identities(HashAlgorithm::Sha256, &members).unwrap();
        let bundle = ProofBundle::from_tree(&tree, &members);

        let json = bundle.to_json().unwrap();
        assert!(json.contains(&hash::to_hex(&tree.root())));

        let parsed = ProofBundle::from_json(&json).unwrap();
        assert_eq!(parsed, bundle);

        for id in &members {
            let proof = parsed.proof(id).unwrap().unwrap();
            assert!(verify(parsed.algorithm, id, &proof, &parsed.root));
        }
    }
}
