//! Merkle Membership Proofs
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    PROOF SYSTEM                             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  leaf.rs     - Identity -> canonical leaf hash              │
//! │  merkle.rs   - Sorted-pair binary tree, proof generation    │
//! │  verify.rs   - Pure proof verification against a root       │
//! │  bundle.rs   - Hex proof bundle for distribution            │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod bundle;
pub mod leaf;
pub mod merkle;
pub mod verify;

// Re-export key types
pub use bundle::ProofBundle;
pub use leaf::{LeafEncoder, LeafHash};
pub use merkle::{BuildError, MerkleProof, MerkleTree, ProofDecodeError, MAX_PROOF_DEPTH};
pub use verify::{verify, verify_raw, ProofVerifier};
