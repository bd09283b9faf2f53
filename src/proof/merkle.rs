//! Merkle Tree Builder
//!
//! Binary Merkle tree over the eligible set, using sorted-pair hashing.
//!
//! Construction rules (shared with the verifier):
//! - leaves are sorted ascending by hash value and de-duplicated, so the root
//!   depends only on the *set* of identities
//! - each parent is `H(min(a, b) || max(a, b))`
//! - an unpaired last node is promoted to the next level unchanged
//!
//! ```text
//!            root
//!          /      \
//!        n01       e        <- e promoted (odd level)
//!       /   \      |
//!      a     b     e        <- sorted leaves: a < b < e
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::hash::{self, Hash32, HashAlgorithm, HASH_LEN};
use crate::core::identity::Identity;
use crate::proof::leaf::{LeafEncoder, LeafHash};

/// Deepest proof the verifier will walk (2^64 leaves).
pub const MAX_PROOF_DEPTH: usize = 64;

/// Errors raised while building a tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// No leaves to commit to.
    #[error("cannot build a merkle tree from an empty leaf set")]
    EmptyLeafSet,
}

/// Binary Merkle tree for an eligible set.
///
/// Immutable once built. Only hashes are stored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MerkleTree {
    /// Hash used for leaves and internal nodes.
    algorithm: HashAlgorithm,
    /// All tree levels (sorted leaves at index 0, root at last index).
    levels: Vec<Vec<Hash32>>,
}

impl MerkleTree {
    /// Build a tree from eligible identities.
    ///
    /// Input order and repeats do not affect the result.
    pub fn from_identities<'a, I>(algorithm: HashAlgorithm, identities: I) -> Result<Self, BuildError>
    where
        I: IntoIterator<Item = &'a Identity>,
    {
        let leaves = LeafEncoder::new(algorithm).encode_all(identities);
        Self::from_leaf_hashes(algorithm, leaves)
    }

    /// Build a tree from pre-hashed leaves.
    pub fn from_leaf_hashes(
        algorithm: HashAlgorithm,
        mut leaves: Vec<LeafHash>,
    ) -> Result<Self, BuildError> {
        if leaves.is_empty() {
            return Err(BuildError::EmptyLeafSet);
        }

        leaves.sort_unstable();
        leaves.dedup();

        let levels = build_levels(algorithm, leaves);
        Ok(Self { algorithm, levels })
    }

    /// Root hash.
    pub fn root(&self) -> Hash32 {
        // Construction guarantees a non-empty top level.
        self.levels
            .last()
            .and_then(|level| level.first())
            .copied()
            .unwrap_or_default()
    }

    /// Hash algorithm the tree was built with.
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Sorted, de-duplicated leaves.
    pub fn leaves(&self) -> &[LeafHash] {
        &self.levels[0]
    }

    /// Number of distinct leaves.
    pub fn leaf_count(&self) -> usize {
        self.leaves().len()
    }

    /// Number of levels above the leaves (0 for a single-leaf tree).
    pub fn depth(&self) -> usize {
        self.levels.len() - 1
    }

    /// Is this leaf committed to by the tree?
    pub fn contains(&self, leaf: &LeafHash) -> bool {
        self.leaves().binary_search(leaf).is_ok()
    }

    /// Is this identity a member of the eligible set?
    pub fn contains_identity(&self, identity: &Identity) -> bool {
        self.contains(&LeafEncoder::new(self.algorithm).encode(identity))
    }

    /// Generate an inclusion proof for a leaf.
    ///
    /// Returns None if the leaf is not in the tree.
    pub fn prove(&self, leaf: &LeafHash) -> Option<MerkleProof> {
        let mut index = self.leaves().binary_search(leaf).ok()?;
        let mut siblings = Vec::with_capacity(self.depth());

        // Walk up the tree, collecting sibling hashes. A promoted node has none.
        for level in &self.levels[..self.levels.len() - 1] {
            let sibling_index = index ^ 1;
            if sibling_index < level.len() {
                siblings.push(level[sibling_index]);
            }
            index /= 2;
        }

        Some(MerkleProof { siblings })
    }

    /// Generate an inclusion proof for an identity.
    pub fn prove_identity(&self, identity: &Identity) -> Option<MerkleProof> {
        self.prove(&LeafEncoder::new(self.algorithm).encode(identity))
    }
}

/// Reduce sorted leaves level by level until one hash remains.
fn build_levels(algorithm: HashAlgorithm, leaves: Vec<Hash32>) -> Vec<Vec<Hash32>> {
    let mut levels = vec![leaves];

    loop {
        let current = &levels[levels.len() - 1];
        if current.len() <= 1 {
            break;
        }

        let next: Vec<Hash32> = current
            .chunks(2)
            .map(|pair| match pair {
                [left, right] => algorithm.hash_pair(left, right),
                [odd] => *odd,
                _ => unreachable!("chunks(2) yields one or two nodes"),
            })
            .collect();

        levels.push(next);
    }

    levels
}

/// Merkle inclusion proof.
///
/// Sibling hashes from the leaf level up to the root. Sorted-pair hashing
/// means no left/right flags are needed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleProof {
    /// Sibling hashes along the path.
    pub siblings: Vec<Hash32>,
}

impl MerkleProof {
    /// Wrap sibling hashes.
    pub fn new(siblings: Vec<Hash32>) -> Self {
        Self { siblings }
    }

    /// Number of siblings.
    pub fn len(&self) -> usize {
        self.siblings.len()
    }

    /// True for a single-leaf tree's proof (or a forged empty one).
    pub fn is_empty(&self) -> bool {
        self.siblings.is_empty()
    }

    /// Size in bytes.
    pub fn size(&self) -> usize {
        self.siblings.len() * HASH_LEN
    }

    /// Hex form handed to claimants.
    pub fn to_hex(&self) -> Vec<String> {
        self.siblings.iter().map(hash::to_hex).collect()
    }

    /// Decode a proof from hex strings.
    pub fn from_hex<S: AsRef<str>>(parts: &[S]) -> Result<Self, ProofDecodeError> {
        check_depth(parts.len())?;
        let siblings = parts
            .iter()
            .enumerate()
            .map(|(index, part)| {
                let text = part.as_ref();
                let digits = text.strip_prefix("0x").unwrap_or(text);
                let bytes = hex::decode(digits).map_err(|_| ProofDecodeError::InvalidHex { index })?;
                to_sibling(index, &bytes)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { siblings })
    }

    /// Decode a proof from raw byte slices.
    pub fn from_slices<B: AsRef<[u8]>>(parts: &[B]) -> Result<Self, ProofDecodeError> {
        check_depth(parts.len())?;
        let siblings = parts
            .iter()
            .enumerate()
            .map(|(index, part)| to_sibling(index, part.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { siblings })
    }
}

fn check_depth(len: usize) -> Result<(), ProofDecodeError> {
    if len > MAX_PROOF_DEPTH {
        return Err(ProofDecodeError::TooDeep(len));
    }
    Ok(())
}

fn to_sibling(index: usize, bytes: &[u8]) -> Result<Hash32, ProofDecodeError> {
    bytes.try_into().map_err(|_| ProofDecodeError::InvalidSiblingLength {
        index,
        len: bytes.len(),
    })
}

/// Proof shape errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProofDecodeError {
    /// A sibling is not exactly 32 bytes.
    #[error("proof sibling {index} is {len} bytes, expected 32")]
    InvalidSiblingLength {
        /// Position in the proof.
        index: usize,
        /// Actual width.
        len: usize,
    },
    /// A sibling is not valid hex.
    #[error("proof sibling {index} is not valid hex")]
    InvalidHex {
        /// Position in the proof.
        index: usize,
    },
    /// More siblings than any supported tree could need.
    #[error("proof has {0} siblings, maximum is 64")]
    TooDeep(usize),
}
