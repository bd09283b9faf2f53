//! Eligibility Collection
//!
//! Turns an ordered log of qualifying actions into the eligible set.
//! Entries inside the window `[from, cutoff]` count, in log order; an
//! identity that acted several times still gets one slot (first occurrence
//! wins).

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

use crate::core::identity::Identity;

/// One qualifying action from the source log.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualifyingAction {
    /// Who acted.
    pub identity: Identity,
    /// Position in the log (block number, sequence id, ...).
    pub sequence: u64,
}

/// Inclusive range of log positions that qualify.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityWindow {
    /// First qualifying position.
    pub from: u64,
    /// Last qualifying position.
    pub cutoff: u64,
}

impl EligibilityWindow {
    /// Everything up to and including `cutoff`.
    pub fn up_to(cutoff: u64) -> Self {
        Self { from: 0, cutoff }
    }

    /// Does a position fall inside the window?
    pub fn contains(&self, sequence: u64) -> bool {
        sequence >= self.from && sequence <= self.cutoff
    }
}

/// Errors reading or interpreting the action log.
#[derive(Debug, Error)]
pub enum EligibilityError {
    /// Log is not in sequence order.
    #[error("action {index} has sequence {sequence}, after {previous}")]
    OutOfOrder {
        /// Offending entry.
        index: usize,
        /// Its position.
        sequence: u64,
        /// Position of the entry before it.
        previous: u64,
    },
    /// Window ends before it starts.
    #[error("window cutoff {cutoff} is before start {from}")]
    InvalidWindow {
        /// Start.
        from: u64,
        /// End.
        cutoff: u64,
    },
    /// Could not read the log.
    #[error("failed to read action log: {0}")]
    Io(#[from] std::io::Error),
    /// Log is not valid JSON.
    #[error("failed to parse action log: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Collect the eligible identities from an ordered action log.
///
/// Output keeps first-occurrence order.
pub fn collect_eligible<I>(
    actions: I,
    window: EligibilityWindow,
) -> Result<Vec<Identity>, EligibilityError>
where
    I: IntoIterator<Item = QualifyingAction>,
{
    if window.cutoff < window.from {
        return Err(EligibilityError::InvalidWindow {
            from: window.from,
            cutoff: window.cutoff,
        });
    }

    let mut seen = BTreeSet::new();
    let mut eligible = Vec::new();
    let mut previous: Option<u64> = None;
    let mut scanned = 0usize;

    for (index, action) in actions.into_iter().enumerate() {
        if let Some(prev) = previous {
            if action.sequence < prev {
                return Err(EligibilityError::OutOfOrder {
                    index,
                    sequence: action.sequence,
                    previous: prev,
                });
            }
        }
        previous = Some(action.sequence);
        scanned += 1;

        if action.sequence > window.cutoff {
            break;
        }
        if window.contains(action.sequence) && seen.insert(action.identity) {
            eligible.push(action.identity);
        }
    }

    debug!(
        "Scanned {} actions, {} eligible identities in [{}, {}]",
        scanned,
        eligible.len(),
        window.from,
        window.cutoff
    );
    Ok(eligible)
}

/// Load an action log: a JSON array of `{ "identity": "0x..", "sequence": n }`.
pub fn load_actions(path: &Path) -> Result<Vec<QualifyingAction>, EligibilityError> {
    let data = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}
