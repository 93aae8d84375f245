//! Proof-of-stake validator election.
//!
//! The draw is seeded from the candidate's base digest, so replaying a block
//! always elects the same validator. Validators are walked in registry order;
//! the first whose running stake total reaches the draw wins.

use crate::blockchain::{Block, CandidateBlock};
use crate::consensus::{ConsensusProof, Validator};
use crate::crypto::{ChainHasher, HexDigest};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sha2::{Digest, Sha256};
use tracing::debug;

/// Elected when the registry holds no stake at all.
pub const DEFAULT_VALIDATOR: &str = "default";

pub fn total_stake(validators: &[Validator]) -> u128 {
    validators.iter().map(|v| u128::from(v.stake)).sum()
}

/// Deterministic draw in `[1, total]` derived from a block digest.
///
/// Each validator owns exactly `stake` of the `total` draw values. `total`
/// must be non-zero.
pub fn draw(digest: &HexDigest, total: u128) -> u128 {
    let seed: [u8; 32] = Sha256::digest(digest.as_bytes()).into();
    let mut rng = StdRng::from_seed(seed);
    rng.gen_range(1..=total)
}

/// Elect a validator for the block with this digest.
pub fn select_validator(digest: &HexDigest, validators: &[Validator]) -> String {
    let total = total_stake(validators);
    if total == 0 {
        debug!("No stake registered, electing {}", DEFAULT_VALIDATOR);
        return DEFAULT_VALIDATOR.to_string();
    }

    let target = draw(digest, total);
    match elect(validators, target) {
        Some(validator) => {
            debug!("Draw {} of {} elects {}", target, total, validator.id);
            validator.id.clone()
        }
        // Unreachable while 1 <= target <= total.
        None => DEFAULT_VALIDATOR.to_string(),
    }
}

/// First validator in registry order whose running stake total reaches
/// `target`. A zero-stake entry never reaches a target of 1 or more before
/// its predecessor does.
pub fn elect(validators: &[Validator], target: u128) -> Option<&Validator> {
    let mut cumulative = 0u128;
    validators.iter().find(|validator| {
        cumulative += u128::from(validator.stake);
        cumulative >= target
    })
}

/// Seal a candidate with Proof-of-Stake. No search happens: the base digest
/// is the block digest and the validator is recorded beside it.
pub fn seal(hasher: &dyn ChainHasher, candidate: CandidateBlock, validators: &[Validator]) -> Block {
    let digest = candidate.base_digest(hasher);
    let validator_id = select_validator(&digest, validators);
    candidate.seal(ConsensusProof::ProofOfStake { validator_id }, digest)
}
