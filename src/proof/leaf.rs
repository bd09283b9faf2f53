//! Leaf Encoding
//!
//! Maps an identity to its canonical leaf hash. The tree builder and the
//! verifier both go through [`LeafEncoder`], so the two sides cannot drift.

use crate::core::hash::{Hash32, HashAlgorithm};
use crate::core::identity::Identity;

/// Leaf hash of one eligible identity.
pub type LeafHash = Hash32;

/// Identity → leaf hash.
///
/// A leaf is `H(identity bytes)`: the 20 raw bytes, no prefix, no text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LeafEncoder {
    algorithm: HashAlgorithm,
}

impl LeafEncoder {
    /// Encoder for the given hash algorithm.
    pub const fn new(algorithm: HashAlgorithm) -> Self {
        Self { algorithm }
    }

    /// Hash algorithm in use.
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Encode one identity.
    #[inline]
    pub fn encode(&self, identity: &Identity) -> LeafHash {
        self.algorithm.hash(identity.as_bytes())
    }

    /// Encode a sequence of identities, preserving order.
    pub fn encode_all<'a, I>(&self, identities: I) -> Vec<LeafHash>
    where
        I: IntoIterator<Item = &'a Identity>,
    {
        identities.into_iter().map(|id| self.encode(id)).collect()
    }
}
