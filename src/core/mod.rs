//! Core primitives.
//!
//! Identities and the hash function. Everything above this layer
//! (leaves, tree, verifier, ledger) is built from these two types.

pub mod hash;
pub mod identity;

// Re-export core types
pub use hash::{Hash32, HashAlgorithm, HASH_LEN};
pub use identity::{Identity, IdentityError, IDENTITY_LEN};
