//! Configuration management for DualChain

use crate::consensus::{ConsensusMode, MiningLimits, Validator};
use crate::consensus::pow::check_difficulty;
use crate::crypto::HasherKind;
use crate::error::{ChainError, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "dualchain.toml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub consensus: ConsensusConfig,
    #[serde(default)]
    pub miner: MinerConfig,
    #[serde(default = "default_validators")]
    pub validators: Vec<Validator>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConsensusConfig {
    #[serde(default)]
    pub mode: ConsensusMode,
    #[serde(default = "default_pow_difficulty")]
    pub pow_difficulty: u32,
    #[serde(default)]
    pub hasher: HasherKind,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MinerConfig {
    #[serde(default = "default_threads")]
    pub threads: usize,
    #[serde(default)]
    pub max_attempts: Option<u64>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            consensus: ConsensusConfig::default(),
            miner: MinerConfig::default(),
            validators: default_validators(),
        }
    }
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self {
            mode: ConsensusMode::default(),
            pow_difficulty: default_pow_difficulty(),
            hasher: HasherKind::default(),
        }
    }
}

impl Default for MinerConfig {
    fn default() -> Self {
        Self {
            threads: default_threads(),
            max_attempts: None,
            timeout_secs: None,
        }
    }
}

impl MinerConfig {
    pub fn limits(&self) -> MiningLimits {
        MiningLimits {
            max_attempts: self.max_attempts,
            timeout: self.timeout_secs.map(Duration::from_secs),
            threads: self.threads.max(1),
        }
    }
}

impl Config {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Config = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate critical values.
    pub fn validate(&self) -> Result<()> {
        let hasher = self.consensus.hasher.build();
        check_difficulty(hasher.as_ref(), self.consensus.pow_difficulty)
            .map_err(|e| ChainError::Config(format!("consensus.pow_difficulty: {}", e)))?;

        if self.miner.threads == 0 {
            return Err(ChainError::Config("miner.threads must be at least 1".to_string()));
        }
        if self.miner.max_attempts == Some(0) {
            return Err(ChainError::Config("miner.max_attempts must be positive when set".to_string()));
        }

        let mut seen = HashSet::new();
        for validator in &self.validators {
            if validator.id.trim().is_empty() {
                return Err(ChainError::Config("validator id must not be empty".to_string()));
            }
            if !seen.insert(validator.id.as_str()) {
                return Err(ChainError::Config(format!("duplicate validator id: {}", validator.id)));
            }
        }

        if self.consensus.mode == ConsensusMode::Pos && self.validators.is_empty() {
            return Err(ChainError::Config(
                "consensus.mode = \"pos\" requires at least one validator".to_string(),
            ));
        }

        Ok(())
    }
}

/// Load configuration from `path`. A missing or empty file yields the
/// defaults.
pub fn load_config(path: impl AsRef<Path>) -> Result<Config> {
    let config_str = match fs::read_to_string(path.as_ref()) {
        Ok(s) => s,
        Err(e) if e.kind() == ErrorKind::NotFound => String::new(),
        Err(e) => return Err(e.into()),
    };

    if config_str.trim().is_empty() {
        return Ok(Config::default());
    }
    Config::from_toml_str(&config_str)
}

fn default_pow_difficulty() -> u32 {
    crate::blockchain::DEFAULT_POW_DIFFICULTY
}

fn default_threads() -> usize {
    1
}

fn default_validators() -> Vec<Validator> {
    vec![
        Validator::new("Node_A", 40),
        Validator::new("Node_B", 30),
        Validator::new("Node_C", 20),
        Validator::new("Node_D", 10),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.consensus.mode, ConsensusMode::Pow);
        assert_eq!(config.consensus.pow_difficulty, 2);
        assert_eq!(config.consensus.hasher, HasherKind::Sha256);
        assert_eq!(config.validators.len(), 4);
        assert_eq!(config.miner.limits(), MiningLimits::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_document() {
        let config = Config::from_toml_str(
            r#"
            [consensus]
            mode = "pos"
            pow_difficulty = 3
            hasher = "simulated"

            [miner]
            threads = 4
            max_attempts = 1000
            timeout_secs = 5

            [[validators]]
            id = "A"
            stake = 40

            [[validators]]
            id = "B"
            stake = 0
            "#,
        )
        .unwrap();

        assert_eq!(config.consensus.mode, ConsensusMode::Pos);
        assert_eq!(config.consensus.pow_difficulty, 3);
        assert_eq!(config.consensus.hasher, HasherKind::Simulated);
        assert_eq!(config.validators, vec![Validator::new("A", 40), Validator::new("B", 0)]);

        let limits = config.miner.limits();
        assert_eq!(limits.threads, 4);
        assert_eq!(limits.max_attempts, Some(1000));
        assert_eq!(limits.timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_partial_document_keeps_defaults() {
        let config = Config::from_toml_str("[consensus]\npow_difficulty = 1\n").unwrap();
        assert_eq!(config.consensus.pow_difficulty, 1);
        assert_eq!(config.miner, MinerConfig::default());
        assert_eq!(config.validators, default_validators());
    }

    #[test]
    fn test_rejects_unsatisfiable_difficulty() {
        let err = Config::from_toml_str("[consensus]\npow_difficulty = 65\n").unwrap_err();
        assert!(err.to_string().contains("pow_difficulty"));
    }

    #[test]
    fn test_rejects_duplicate_validators() {
        let err = Config::from_toml_str(
            "[[validators]]\nid = \"A\"\nstake = 1\n[[validators]]\nid = \"A\"\nstake = 2\n",
        )
        .unwrap_err();
        assert_eq!(err, ChainError::Config("duplicate validator id: A".to_string()));
    }

    #[test]
    fn test_rejects_pos_mode_without_validators() {
        let err = Config::from_toml_str("validators = []\n[consensus]\nmode = \"pos\"\n").unwrap_err();
        assert!(matches!(err, ChainError::Config(_)));
    }

    #[test]
    fn test_rejects_negative_stake() {
        let err = Config::from_toml_str("[[validators]]\nid = \"A\"\nstake = -5\n").unwrap_err();
        assert!(matches!(err, ChainError::Config(_)));
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[miner]\nthreads = 2").unwrap();
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.miner.threads, 2);
    }
}
