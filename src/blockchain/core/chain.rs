use crate::blockchain::core::block::{Block, CandidateBlock};
use crate::blockchain::core::validation::{validate_linkage, verify_chain};
use crate::config::Config;
use crate::consensus::{pos, pow, ConsensusMode, MiningLimits, Validator};
use crate::crypto::{ChainHasher, Sha256Hasher};
use crate::error::{ChainError, Result};
use crate::transaction::Transaction;
use std::sync::Arc;
use tracing::{info, warn};

pub const DEFAULT_POW_DIFFICULTY: u32 = 2;

/// Append-only sequence of sealed blocks plus the Proof-of-Stake registry.
///
/// Appends take `&mut self`, so at most one writer reads and extends the
/// tail at a time. Sealed blocks are handed out as shared references only.
#[derive(Debug, Clone)]
pub struct Blockchain {
    blocks: Vec<Block>,
    validators: Vec<Validator>,
    difficulty: u32,
    limits: MiningLimits,
    hasher: Arc<dyn ChainHasher>,
}

impl Default for Blockchain {
    fn default() -> Self {
        Self::new(DEFAULT_POW_DIFFICULTY)
    }
}

impl Blockchain {
    /// Create a new `Blockchain` hashing with SHA-256.
    pub fn new(pow_difficulty: u32) -> Self {
        Self::with_hasher(pow_difficulty, Arc::new(Sha256Hasher))
    }

    /// Create a new `Blockchain` with the provided digest function.
    pub fn with_hasher(pow_difficulty: u32, hasher: Arc<dyn ChainHasher>) -> Self {
        let genesis = Block::genesis(hasher.as_ref());
        info!(
            "Created chain with genesis {} (hasher = {}, difficulty = {})",
            genesis.digest().short(16),
            hasher.name(),
            pow_difficulty
        );
        Blockchain {
            blocks: vec![genesis],
            validators: Vec::new(),
            difficulty: pow_difficulty,
            limits: MiningLimits::default(),
            hasher,
        }
    }

    /// Build a chain from a validated configuration.
    pub fn from_config(config: &Config) -> Self {
        let mut chain = Self::with_hasher(config.consensus.pow_difficulty, config.consensus.hasher.build());
        chain.set_validators(config.validators.clone());
        chain.set_mining_limits(config.miner.limits());
        chain
    }

    /// Replace the validator registry. Last write wins.
    pub fn set_validators(&mut self, validators: Vec<Validator>) {
        self.validators = validators;
    }

    pub fn set_mining_limits(&mut self, limits: MiningLimits) {
        self.limits = limits;
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Always false: the genesis block exists from construction.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn genesis(&self) -> &Block {
        &self.blocks[0]
    }

    /// The chain always holds at least the genesis block.
    pub fn last_block(&self) -> &Block {
        &self.blocks[self.blocks.len() - 1]
    }

    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }

    pub fn validators(&self) -> &[Validator] {
        &self.validators
    }

    pub fn mining_limits(&self) -> &MiningLimits {
        &self.limits
    }

    pub fn hasher(&self) -> &dyn ChainHasher {
        self.hasher.as_ref()
    }

    /// Candidate extending the current tail.
    pub fn next_candidate(&self, transactions: Vec<Transaction>) -> CandidateBlock {
        CandidateBlock::new(
            self.hasher.as_ref(),
            self.blocks.len() as u64,
            self.last_block().digest().clone(),
            transactions,
        )
    }

    /// Mine and append a Proof-of-Work block. On error the chain is unchanged.
    pub fn append_pow(&mut self, transactions: Vec<Transaction>) -> Result<&Block> {
        let candidate = self.next_candidate(transactions);
        let block = pow::seal(self.hasher.as_ref(), candidate, self.difficulty, &self.limits)?;
        Ok(self.push(block))
    }

    /// Elect a validator and append a Proof-of-Stake block. Refused when the
    /// registry is empty.
    pub fn append_pos(&mut self, transactions: Vec<Transaction>) -> Result<&Block> {
        if self.validators.is_empty() {
            return Err(ChainError::NoValidatorsConfigured);
        }
        let candidate = self.next_candidate(transactions);
        let block = pos::seal(self.hasher.as_ref(), candidate, &self.validators);
        Ok(self.push(block))
    }

    pub fn append(&mut self, mode: ConsensusMode, transactions: Vec<Transaction>) -> Result<&Block> {
        match mode {
            ConsensusMode::Pow => self.append_pow(transactions),
            ConsensusMode::Pos => self.append_pos(transactions),
        }
    }

    fn push(&mut self, block: Block) -> &Block {
        info!(
            "Appended block {} [{}] {}",
            block.index(),
            block.consensus_info(),
            block.digest().short(16)
        );
        let position = self.blocks.len();
        self.blocks.push(block);
        &self.blocks[position]
    }

    /// Linkage check: each block's previous digest matches its predecessor.
    /// Logs the first offending index.
    pub fn validate(&self) -> bool {
        match self.validate_linkage() {
            Ok(()) => true,
            Err(e) => {
                warn!("Chain validation failed: {}", e);
                false
            }
        }
    }

    pub fn validate_linkage(&self) -> Result<()> {
        validate_linkage(&self.blocks)
    }

    /// Linkage plus per-block checks of index, Merkle root, stored digest and
    /// Proof-of-Work difficulty.
    pub fn verify(&self) -> Result<()> {
        verify_chain(self.hasher.as_ref(), &self.blocks)
    }
}
