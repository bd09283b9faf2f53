//! Account Identities
//!
//! Fixed-width 20-byte account identifiers. Every identity is held in
//! canonical byte form; text is normalized here before it ever reaches
//! the leaf encoder.

use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Width in bytes of an account identity.
pub const IDENTITY_LEN: usize = 20;

/// An eligible account (e.g. a 20-byte address).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identity([u8; IDENTITY_LEN]);

impl Identity {
    /// Wrap raw canonical bytes.
    pub const fn new(bytes: [u8; IDENTITY_LEN]) -> Self {
        Self(bytes)
    }

    /// Build from a byte slice, rejecting any width other than 20.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, IdentityError> {
        let raw: [u8; IDENTITY_LEN] = bytes
            .try_into()
            .map_err(|_| IdentityError::InvalidLength(bytes.len()))?;
        Ok(Self(raw))
    }

    /// Parse `0x`-prefixed (or bare) hex text.
    ///
    /// Hex digits may be any case; the result is the same canonical bytes.
    pub fn parse(text: &str) -> Result<Self, IdentityError> {
        let trimmed = text.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);

        if digits.len() != IDENTITY_LEN * 2 {
            return Err(IdentityError::InvalidLength((digits.len() + 1) / 2));
        }

        let mut raw = [0u8; IDENTITY_LEN];
        hex::decode_to_slice(digits, &mut raw)
            .map_err(|_| IdentityError::InvalidHex(text.to_string()))?;
        Ok(Self(raw))
    }

    /// Canonical bytes.
    pub fn as_bytes(&self) -> &[u8; IDENTITY_LEN] {
        &self.0
    }

    /// Short prefix for log lines.
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Identity {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<[u8; IDENTITY_LEN]> for Identity {
    fn from(bytes: [u8; IDENTITY_LEN]) -> Self {
        Self(bytes)
    }
}

impl Serialize for Identity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.collect_str(self)
        } else {
            self.0.serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for Identity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let text = String::deserialize(deserializer)?;
            Self::parse(&text).map_err(D::Error::custom)
        } else {
            <[u8; IDENTITY_LEN]>::deserialize(deserializer).map(Self)
        }
    }
}

/// Identity shape errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    /// Not exactly 20 bytes.
    #[error("identity must be 20 bytes, got {0}")]
    InvalidLength(usize),
    /// Contains non-hex characters.
    #[error("identity is not valid hex: {0}")]
    InvalidHex(String),
}
