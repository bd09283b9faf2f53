//! Proof Verification
//!
//! Recompute the path from an identity's leaf to the root and compare.
//! Verification is pure: it never touches claim state and may be called
//! any number of times from any thread.

use crate::core::hash::{Hash32, HashAlgorithm};
use crate::core::identity::Identity;
use crate::proof::leaf::{LeafEncoder, LeafHash};
use crate::proof::merkle::{MerkleProof, MAX_PROOF_DEPTH};

/// Verify an identity's proof against a root.
pub fn verify(
    algorithm: HashAlgorithm,
    identity: &Identity,
    proof: &MerkleProof,
    root: &Hash32,
) -> bool {
    let leaf = LeafEncoder::new(algorithm).encode(identity);
    verify_leaf(algorithm, &leaf, proof, root)
}

/// Fold a proof up from a leaf hash and compare with the root.
///
/// Internal nodes are not domain-separated from leaves, so `leaf` must come
/// from [`LeafEncoder`]; callers outside this module only ever pass identities.
fn verify_leaf(
    algorithm: HashAlgorithm,
    leaf: &LeafHash,
    proof: &MerkleProof,
    root: &Hash32,
) -> bool {
    if proof.len() > MAX_PROOF_DEPTH {
        return false;
    }

    let computed = proof
        .siblings
        .iter()
        .fold(*leaf, |current, sibling| algorithm.hash_pair(&current, sibling));

    computed == *root
}

/// Verify untrusted raw bytes.
///
/// Any shape problem (identity not 20 bytes, sibling not 32 bytes, root not
/// 32 bytes, proof too deep) fails closed with `false`.
pub fn verify_raw<B: AsRef<[u8]>>(
    algorithm: HashAlgorithm,
    identity: &[u8],
    proof: &[B],
    root: &[u8],
) -> bool {
    let Ok(identity) = Identity::from_slice(identity) else {
        return false;
    };
    let Ok(proof) = MerkleProof::from_slices(proof) else {
        return false;
    };
    let Ok(root) = <Hash32>::try_from(root) else {
        return false;
    };
    verify(algorithm, &identity, &proof, &root)
}

/// Verifier bound to one published root.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProofVerifier {
    algorithm: HashAlgorithm,
    root: Hash32,
}

impl ProofVerifier {
    /// Bind to a root.
    pub fn new(algorithm: HashAlgorithm, root: Hash32) -> Self {
        Self { algorithm, root }
    }

    /// Root proofs are checked against.
    pub fn root(&self) -> &Hash32 {
        &self.root
    }

    /// Hash algorithm in use.
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Does this proof place the identity under the bound root?
    pub fn verify(&self, identity: &Identity, proof: &MerkleProof) -> bool {
        verify(self.algorithm, identity, proof, &self.root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proof::merkle::MerkleTree;
    use proptest::prelude::*;

    fn member(i: u8) -> Identity {
        Identity::new([i; 20])
    }

    fn tree_of(n: u8) -> MerkleTree {
        let members: Vec<Identity> = (1..=n).map(member).collect();
        MerkleTree::from_identities(HashAlgorithm::Keccak256, &members).unwrap()
    }

    #[test]
    fn test_member_proofs_verify() {
        let tree = tree_of(4);
        let root = tree.root();

        for i in 1..=4 {
            let proof = tree.prove_identity(&member(i)).unwrap();
            assert!(verify(HashAlgorithm::Keccak256, &member(i), &proof, &root));
        }
    }

    #[test]
    fn test_wrong_identity_fails() {
        let tree = tree_of(4);
        let proof = tree.prove_identity(&member(1)).unwrap();

        // Another member with member 1's proof.
        assert!(!verify(HashAlgorithm::Keccak256, &member(2), &proof, &tree.root()));
        // A non-member with member 1's proof.
        assert!(!verify(HashAlgorithm::Keccak256, &member(5), &proof, &tree.root()));
    }

    #[test]
    fn test_wrong_root_fails() {
        let tree = tree_of(4);
        let other = tree_of(5);
        let proof = tree.prove_identity(&member(1)).unwrap();

        assert!(!verify(HashAlgorithm::Keccak256, &member(1), &proof, &other.root()));
    }

    #[test]
    fn test_wrong_algorithm_fails() {
        let tree = tree_of(4);
        let proof = tree.prove_identity(&member(3)).unwrap();
        assert!(!verify(HashAlgorithm::Sha256, &member(3), &proof, &tree.root()));
    }

    #[test]
    fn test_empty_proof_only_for_single_leaf() {
        let single = tree_of(1);
        assert!(verify(HashAlgorithm::Keccak256, &member(1), &MerkleProof::default(), &single.root()));

        let tree = tree_of(4);
        assert!(!verify(HashAlgorithm::Keccak256, &member(1), &MerkleProof::default(), &tree.root()));
    }

    #[test]
    fn test_verify_is_idempotent() {
        let tree = tree_of(7);
        let verifier = ProofVerifier::new(tree.algorithm(), tree.root());
        let proof = tree.prove_identity(&member(6)).unwrap();

        let first = verifier.verify(&member(6), &proof);
        for _ in 0..5 {
            assert_eq!(verifier.verify(&member(6), &proof), first);
        }
        assert!(first);
    }

    #[test]
    fn test_raw_inputs_fail_closed() {
        let tree = tree_of(4);
        let root = tree.root();
        let proof: Vec<Vec<u8>> = tree
            .prove_identity(&member(2))
            .unwrap()
            .siblings
            .iter()
            .map(|s| s.to_vec())
            .collect();

        assert!(verify_raw(HashAlgorithm::Keccak256, &[2; 20], &proof, &root));

        // Short identity, short root, truncated sibling.
        assert!(!verify_raw(HashAlgorithm::Keccak256, &[2; 19], &proof, &root));
        assert!(!verify_raw(HashAlgorithm::Keccak256, &[2; 20], &proof, &root[..31]));
        let mut truncated = proof.clone();
        truncated[0].pop();
        assert!(!verify_raw(HashAlgorithm::Keccak256, &[2; 20], &truncated, &root));
    }

    #[test]
    fn test_overlong_proof_rejected() {
        let tree = tree_of(2);
        let mut proof = tree.prove_identity(&member(1)).unwrap();
        proof.siblings.resize(MAX_PROOF_DEPTH + 1, [0; 32]);
        assert!(!verify(HashAlgorithm::Keccak256, &member(1), &proof, &tree.root()));
    }

    #[test]
    fn test_internal_node_is_not_a_claimable_identity() {
        let algo = HashAlgorithm::Keccak256;
        let tree = tree_of(4);
        let leaves = tree.leaves();
        let node = algo.hash_pair(&leaves[0], &leaves[1]);
        let upper = algo.hash_pair(&leaves[2], &leaves[3]);

        // Folding from an internal node does reach the root...
        assert!(verify_leaf(algo, &node, &MerkleProof::new(vec![upper]), &tree.root()));
        // ...but every public entry point hashes a 20-byte identity first.
        assert!(!verify_raw(algo, &node, &[upper], &tree.root()));
        let truncated = Identity::from_slice(&node[..20]).unwrap();
        assert!(!verify(algo, &truncated, &MerkleProof::new(vec![upper]), &tree.root()));
    }

    proptest! {
        /// No random proof lets a non-member verify.
        #[test]
        fn prop_forged_proofs_fail(
            outsider in prop::array::uniform20(any::<u8>()),
            siblings in prop::collection::vec(prop::array::uniform32(any::<u8>()), 0..8),
        ) {
            let tree = tree_of(16);
            let outsider = Identity::new(outsider);
            prop_assume!(!tree.contains_identity(&outsider));

            let proof = MerkleProof::new(siblings);
            prop_assert!(!verify(HashAlgorithm::Keccak256, &outsider, &proof, &tree.root()));
        }

        /// Random byte soup never verifies and never panics.
        #[test]
        fn prop_raw_garbage_fails_closed(
            identity in prop::collection::vec(any::<u8>(), 0..40),
            proof in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..40), 0..6),
        ) {
            let tree = tree_of(9);
            let is_member = identity.len() == 20
                && Identity::from_slice(&identity).map(|id| tree.contains_identity(&id)).unwrap_or(false);
            prop_assume!(!is_member);
            prop_assert!(!verify_raw(HashAlgorithm::Keccak256, &identity, &proof, &tree.root()));
        }

        /// Tampering with any single sibling byte breaks a valid proof.
        #[test]
        fn prop_tampered_proof_fails(
            index in 1u8..=12,
            position in 0usize..32,
            flip in 1u8..=255,
        ) {
            let tree = tree_of(12);
            let mut proof = tree.prove_identity(&member(index)).unwrap();
            let target = position % proof.len();
            proof.siblings[target][position] ^= flip;
            prop_assert!(!verify(HashAlgorithm::Keccak256, &member(index), &proof, &tree.root()));
        }
    }
}
