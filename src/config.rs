//! Airdrop Configuration
//!
//! Read from `AIRDROP_*` environment variables. Unset variables take the
//! defaults below; set but unparseable variables are errors.

use std::path::PathBuf;
use thiserror::Error;

use crate::claim::reward::Amount;
use crate::core::hash::HashAlgorithm;
use crate::eligibility::EligibilityWindow;

/// One whole token in base units (18 decimals).
pub const TOKEN: Amount = 1_000_000_000_000_000_000;

/// Airdrop configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AirdropConfig {
    /// Reward per eligible identity, in base units.
    pub reward_amount: Amount,
    /// Funds available to the reward ledger.
    pub pool: Amount,
    /// Hash function for leaves and nodes.
    pub algorithm: HashAlgorithm,
    /// Qualifying positions in the action log.
    pub window: EligibilityWindow,
    /// JSON action log. If None, the demo log is generated.
    pub eligibility_file: Option<PathBuf>,
    /// Where to write the published parameters and proofs.
    pub publish_file: Option<PathBuf>,
    /// Where to persist claim state.
    pub snapshot_file: Option<PathBuf>,
}

impl Default for AirdropConfig {
    fn default() -> Self {
        Self {
            reward_amount: 500 * TOKEN,
            pool: 1_000_000_000 * TOKEN,
            algorithm: HashAlgorithm::Keccak256,
            window: EligibilityWindow::up_to(11),
            eligibility_file: None,
            publish_file: None,
            snapshot_file: None,
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Variable is set but does not parse.
    #[error("invalid value for {var}: {value:?}")]
    InvalidValue {
        /// Variable name.
        var: &'static str,
        /// Raw value.
        value: String,
    },
    /// Reward must be positive.
    #[error("reward amount must be greater than zero")]
    ZeroReward,
    /// Window ends before it starts.
    #[error("cutoff {cutoff} is before start {from}")]
    InvalidWindow {
        /// Start.
        from: u64,
        /// End.
        cutoff: u64,
    },
}

impl AirdropConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Create config from any variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let config = Self {
            reward_amount: parse_var(&lookup, "AIRDROP_REWARD_AMOUNT")?
                .unwrap_or(defaults.reward_amount),
            pool: parse_var(&lookup, "AIRDROP_POOL")?.unwrap_or(defaults.pool),
            algorithm: parse_var(&lookup, "AIRDROP_HASH")?.unwrap_or(defaults.algorithm),
            window: EligibilityWindow {
                from: parse_var(&lookup, "AIRDROP_FROM")?.unwrap_or(defaults.window.from),
                cutoff: parse_var(&lookup, "AIRDROP_CUTOFF")?.unwrap_or(defaults.window.cutoff),
            },
            eligibility_file: lookup("AIRDROP_ELIGIBILITY_FILE").map(PathBuf::from),
            publish_file: lookup("AIRDROP_PUBLISH_FILE").map(PathBuf::from),
            snapshot_file: lookup("AIRDROP_SNAPSHOT_FILE").map(PathBuf::from),
        };

        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.reward_amount == 0 {
            return Err(ConfigError::ZeroReward);
        }
        if self.window.cutoff < self.window.from {
            return Err(ConfigError::InvalidWindow {
                from: self.window.from,
                cutoff: self.window.cutoff,
            });
        }
        Ok(())
    }
}

fn parse_var<T, F>(lookup: &F, var: &'static str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { var, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<AirdropConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AirdropConfig::from_lookup(|var| vars.get(var).cloned())
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config, AirdropConfig::default());
        assert_eq!(config.reward_amount, 500 * TOKEN);
        assert_eq!(config.window.cutoff, 11);
        assert_eq!(config.algorithm, HashAlgorithm::Keccak256);
    }

    #[test]
    fn test_reads_all_variables() {
        let config = config_from(&[
            ("AIRDROP_REWARD_AMOUNT", "42"),
            ("AIRDROP_POOL", "1000"),
            ("AIRDROP_HASH", "sha256"),
            ("AIRDROP_FROM", "3"),
            ("AIRDROP_CUTOFF", "99"),
            ("AIRDROP_ELIGIBILITY_FILE", "actions.json"),
            ("AIRDROP_PUBLISH_FILE", "out/params.json"),
            ("AIRDROP_SNAPSHOT_FILE", "claims.bin"),
        ])
        .unwrap();

        assert_eq!(config.reward_amount, 42);
        assert_eq!(config.pool, 1000);
        assert_eq!(config.algorithm, HashAlgorithm::Sha256);
        assert_eq!(config.window, EligibilityWindow { from: 3, cutoff: 99 });
        assert_eq!(config.eligibility_file, Some(PathBuf::from("actions.json")));
        assert_eq!(config.publish_file, Some(PathBuf::from("out/params.json")));
        assert_eq!(config.snapshot_file, Some(PathBuf::from("claims.bin")));
    }

    #[test]
    fn test_invalid_values_are_errors() {
        assert_eq!(
            config_from(&[("AIRDROP_CUTOFF", "soon")]),
            Err(ConfigError::InvalidValue {
                var: "AIRDROP_CUTOFF",
                value: "soon".to_string()
            })
        );
        assert!(matches!(
            config_from(&[("AIRDROP_HASH", "md5")]),
            Err(ConfigError::InvalidValue { var: "AIRDROP_HASH", .. })
        ));
        assert!(matches!(
            config_from(&[("AIRDROP_REWARD_AMOUNT", "-1")]),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_zero_reward_rejected() {
        assert_eq!(
            config_from(&[("AIRDROP_REWARD_AMOUNT", "0")]),
            Err(ConfigError::ZeroReward)
        );
    }

    #[test]
    fn test_inverted_window_rejected() {
        assert_eq!(
            config_from(&[("AIRDROP_FROM", "20"), ("AIRDROP_CUTOFF", "10")]),
            Err(ConfigError::InvalidWindow { from: 20, cutoff: 10 })
        );
    }
}
