//! Error types for DualChain

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    #[error("Unsatisfiable difficulty: {difficulty} leading zeros requested but digests are {digest_len} characters long")]
    UnsatisfiableDifficulty { difficulty: u32, digest_len: usize },
    #[error("No validators configured for Proof-of-Stake")]
    NoValidatorsConfigured,
    #[error("Mining aborted after {attempts} attempts")]
    MiningAborted { attempts: u64 },
    #[error("Broken linkage at block {index}: previous digest does not match predecessor")]
    LinkageBroken { index: usize },
    #[error("Index mismatch at position {index}: block claims index {found}")]
    IndexMismatch { index: usize, found: u64 },
    #[error("Merkle root mismatch at block {index}")]
    MerkleRootMismatch { index: usize },
    #[error("Stored digest is stale at block {index}")]
    DigestMismatch { index: usize },
    #[error("Block {index} does not satisfy difficulty {difficulty}")]
    InsufficientWork { index: usize, difficulty: u32 },
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl ChainError {
    /// Index of the offending block for validation failures.
    pub fn block_index(&self) -> Option<usize> {
        match self {
            ChainError::LinkageBroken { index }
            | ChainError::IndexMismatch { index, .. }
            | ChainError::MerkleRootMismatch { index }
            | ChainError::DigestMismatch { index }
            | ChainError::InsufficientWork { index, .. } => Some(*index),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ChainError {
    fn from(err: std::io::Error) -> Self {
        ChainError::Io(err.to_string())
    }
}

impl From<toml::de::Error> for ChainError {
    fn from(err: toml::de::Error) -> Self {
        ChainError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for ChainError {
    fn from(err: serde_json::Error) -> Self {
        ChainError::Serialization(err.to_string())
    }
}

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, ChainError>;
