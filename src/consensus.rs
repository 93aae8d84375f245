//! Consensus strategies for sealing candidate blocks
//!
//! A candidate block becomes a [`Block`](crate::blockchain::Block) through one
//! of two strategies:
//! - [`pow`] searches for a nonce whose digest starts with enough `'0'`s;
//! - [`pos`] elects a validator by a stake-weighted draw seeded from the
//!   block digest.

pub mod pos;
pub mod pow;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Which append path a call uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsensusMode {
    #[default]
    Pow,
    Pos,
}

impl fmt::Display for ConsensusMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConsensusMode::Pow => write!(f, "PoW"),
            ConsensusMode::Pos => write!(f, "PoS"),
        }
    }
}

/// Consensus-specific proof carried by a sealed block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConsensusProof {
    Genesis,
    ProofOfWork { nonce: u64, difficulty: u32 },
    ProofOfStake { validator_id: String },
}

impl ConsensusProof {
    /// Nonce participating in the block digest. Only Proof-of-Work has one.
    pub fn nonce(&self) -> Option<u64> {
        match self {
            ConsensusProof::ProofOfWork { nonce, .. } => Some(*nonce),
            _ => None,
        }
    }

    pub fn difficulty(&self) -> Option<u32> {
        match self {
            ConsensusProof::ProofOfWork { difficulty, .. } => Some(*difficulty),
            _ => None,
        }
    }

    pub fn validator_id(&self) -> Option<&str> {
        match self {
            ConsensusProof::ProofOfStake { validator_id } => Some(validator_id),
            _ => None,
        }
    }

    pub fn mode(&self) -> Option<ConsensusMode> {
        match self {
            ConsensusProof::Genesis => None,
            ConsensusProof::ProofOfWork { .. } => Some(ConsensusMode::Pow),
            ConsensusProof::ProofOfStake { .. } => Some(ConsensusMode::Pos),
        }
    }
}

impl fmt::Display for ConsensusProof {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConsensusProof::Genesis => write!(f, "Base/Genesis"),
            ConsensusProof::ProofOfWork { nonce, difficulty } => {
                write!(f, "PoW(nonce={}, difficulty={})", nonce, difficulty)
            }
            ConsensusProof::ProofOfStake { validator_id } => write!(f, "PoS(validator={})", validator_id),
        }
    }
}

/// A participant in Proof-of-Stake elections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validator {
    pub id: String,
    pub stake: u64,
}

impl Validator {
    pub fn new(id: impl Into<String>, stake: u64) -> Self {
        Validator { id: id.into(), stake }
    }
}

/// Bounds on a Proof-of-Work search. The default is unbounded and
/// single-threaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MiningLimits {
    pub max_attempts: Option<u64>,
    pub timeout: Option<Duration>,
    pub threads: usize,
}

impl Default for MiningLimits {
    fn default() -> Self {
        Self {
            max_attempts: None,
            timeout: None,
            threads: 1,
        }
    }
}

impl MiningLimits {
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Cap the search at `attempts` nonces. At least one nonce is always tried.
    pub fn with_max_attempts(mut self, attempts: u64) -> Self {
        self.max_attempts = Some(attempts.max(1));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads.max(1);
        self
    }
}
