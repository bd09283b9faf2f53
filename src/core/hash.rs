//! Hash Primitive
//!
//! One fixed 256-bit hash used uniformly for leaves and internal nodes.
//! The algorithm is chosen once per campaign and published with the root.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sha3::Keccak256;
use std::fmt;
use std::str::FromStr;

/// Hash output type (256 bits / 32 bytes)
pub type Hash32 = [u8; 32];

/// Width in bytes of every leaf and node hash.
pub const HASH_LEN: usize = 32;

/// Hash function shared by the leaf encoder, the tree builder and the verifier.
///
/// Keccak-256 is the default since it is what sorted-pair airdrop tooling
/// (and on-chain verifiers) use for 20-byte account identities.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// Keccak-256 (pre-standard SHA-3 padding).
    #[default]
    Keccak256,
    /// SHA-256.
    Sha256,
}

impl HashAlgorithm {
    /// Hash arbitrary bytes.
    pub fn hash(&self, data: &[u8]) -> Hash32 {
        match self {
            Self::Keccak256 => digest::<Keccak256>(&[data]),
            Self::Sha256 => digest::<Sha256>(&[data]),
        }
    }

    /// Hash two nodes after ordering them by byte value.
    ///
    /// `hash_pair(a, b) == hash_pair(b, a)`, so proofs carry no left/right flags.
    pub fn hash_pair(&self, a: &Hash32, b: &Hash32) -> Hash32 {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        match self {
            Self::Keccak256 => digest::<Keccak256>(&[lo.as_slice(), hi.as_slice()]),
            Self::Sha256 => digest::<Sha256>(&[lo.as_slice(), hi.as_slice()]),
        }
    }

    /// Canonical lowercase name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Keccak256 => "keccak256",
            Self::Sha256 => "sha256",
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unknown hash algorithm name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown hash algorithm: {0}")]
pub struct UnknownHashAlgorithm(pub String);

impl FromStr for HashAlgorithm {
    type Err = UnknownHashAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "keccak256" => Ok(Self::Keccak256),
            "sha256" => Ok(Self::Sha256),
            other => Err(UnknownHashAlgorithm(other.to_string())),
        }
    }
}

fn digest<D: Digest>(parts: &[&[u8]]) -> Hash32 {
    let mut hasher = D::new();
    for part in parts {
        hasher.update(part);
    }
    let mut out = [0u8; HASH_LEN];
    out.copy_from_slice(&hasher.finalize());
    out
}

/// Render a hash as `0x`-prefixed lowercase hex.
pub fn to_hex(hash: &Hash32) -> String {
    format!("0x{}", hex::encode(hash))
}

/// Parse a `0x`-prefixed (or bare) 64-digit hex string into a hash.
///
/// Returns None for any other length or non-hex input.
pub fn from_hex(s: &str) -> Option<Hash32> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    let mut out = [0u8; HASH_LEN];
    hex::decode_to_slice(digits, &mut out).ok()?;
    Some(out)
}

/// Serde adapter storing a [`Hash32`] as a hex string.
pub mod hex_hash {
    use super::{from_hex, to_hex, Hash32};
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    /// Serialize as `0x`-prefixed hex.
    pub fn serialize<S: Serializer>(hash: &Hash32, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&to_hex(hash))
    }

    /// Deserialize from hex, rejecting anything that is not exactly 32 bytes.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Hash32, D::Error> {
        let s = String::deserialize(deserializer)?;
        from_hex(&s).ok_or_else(|| D::Error::custom(format!("invalid 32-byte hex hash: {s}")))
    }
}
