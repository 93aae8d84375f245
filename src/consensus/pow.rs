//! Proof-of-work sealing.
//!
//! The search starts at nonce 0 and moves upward, so the sealed block always
//! carries the lowest nonce whose digest satisfies the difficulty. The
//! parallel search keeps that property by scanning the nonce space in batches
//! and taking the first hit of the first batch that has one.

use crate::blockchain::{Block, BlockHeader, CandidateBlock};
use crate::consensus::{ConsensusProof, MiningLimits};
use crate::crypto::{ChainHasher, HexDigest};
use crate::error::{ChainError, Result};
use rayon::prelude::*;
use std::time::Instant;
use tracing::{debug, info};

/// Attempts between progress log lines.
const PROGRESS_INTERVAL: u64 = 1_000_000;
/// Attempts between deadline checks in the sequential search.
const DEADLINE_CHECK_INTERVAL: u64 = 1024;
/// Nonces handed to each worker per parallel batch.
const NONCES_PER_WORKER: u64 = 4096;

/// Outcome of a successful nonce search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MiningOutcome {
    pub nonce: u64,
    pub digest: HexDigest,
    pub attempts: u64,
}

/// True when the first `difficulty` characters of `digest` are all `'0'`.
pub fn meets_difficulty(digest: &HexDigest, difficulty: u32) -> bool {
    let required = difficulty as usize;
    if required == 0 {
        return true;
    }
    if required > digest.len() {
        return false;
    }
    digest.as_bytes()[..required].iter().all(|b| *b == b'0')
}

/// Reject difficulties that no digest of this hasher could ever satisfy.
pub fn check_difficulty(hasher: &dyn ChainHasher, difficulty: u32) -> Result<()> {
    let digest_len = hasher.digest_len();
    if difficulty as usize > digest_len {
        return Err(ChainError::UnsatisfiableDifficulty { difficulty, digest_len });
    }
    Ok(())
}

/// Search for a nonce that makes `header` satisfy `difficulty`.
pub fn mine(
    hasher: &dyn ChainHasher,
    header: &BlockHeader,
    difficulty: u32,
    limits: &MiningLimits,
) -> Result<MiningOutcome> {
    check_difficulty(hasher, difficulty)?;
    if limits.threads > 1 {
        mine_parallel(hasher, header, difficulty, limits)
    } else {
        mine_sequential(hasher, header, difficulty, limits)
    }
}

/// Seal a candidate with Proof-of-Work.
pub fn seal(
    hasher: &dyn ChainHasher,
    candidate: CandidateBlock,
    difficulty: u32,
    limits: &MiningLimits,
) -> Result<Block> {
    let started = Instant::now();
    let outcome = mine(hasher, candidate.header(), difficulty, limits)?;
    info!(
        "Sealed PoW block {} with nonce {} after {} attempts in {}",
        candidate.header().index,
        outcome.nonce,
        outcome.attempts,
        humantime::format_duration(started.elapsed())
    );
    Ok(candidate.seal(
        ConsensusProof::ProofOfWork {
            nonce: outcome.nonce,
            difficulty,
        },
        outcome.digest,
    ))
}

fn mine_sequential(
    hasher: &dyn ChainHasher,
    header: &BlockHeader,
    difficulty: u32,
    limits: &MiningLimits,
) -> Result<MiningOutcome> {
    let started = Instant::now();
    let mut nonce = 0u64;
    let mut attempts = 0u64;

    loop {
        let digest = header.digest(hasher, Some(nonce));
        attempts += 1;
        if meets_difficulty(&digest, difficulty) {
            return Ok(MiningOutcome { nonce, digest, attempts });
        }

        if limits.max_attempts.is_some_and(|max| attempts >= max) {
            return Err(ChainError::MiningAborted { attempts });
        }
        if attempts % DEADLINE_CHECK_INTERVAL == 0 {
            if let Some(timeout) = limits.timeout {
                if started.elapsed() >= timeout {
                    return Err(ChainError::MiningAborted { attempts });
                }
            }
        }
        if attempts % PROGRESS_INTERVAL == 0 {
            debug!("Block {}: {} nonces tried", header.index, attempts);
        }

        nonce = nonce
            .checked_add(1)
            .ok_or(ChainError::MiningAborted { attempts })?;
    }
}

fn mine_parallel(
    hasher: &dyn ChainHasher,
    header: &BlockHeader,
    difficulty: u32,
    limits: &MiningLimits,
) -> Result<MiningOutcome> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(limits.threads)
        .build()
        .map_err(|e| ChainError::Config(format!("Failed to build mining pool: {}", e)))?;
    let batch = NONCES_PER_WORKER.saturating_mul(limits.threads as u64);
    let started = Instant::now();

    pool.install(|| {
        let mut start = 0u64;
        loop {
            let mut end = start.saturating_add(batch);
            if let Some(max) = limits.max_attempts {
                end = end.min(max.max(1));
            }
            if end <= start {
                return Err(ChainError::MiningAborted { attempts: start });
            }

            let found = (start..end)
                .into_par_iter()
                .map(|nonce| (nonce, header.digest(hasher, Some(nonce))))
                .find_first(|(_, digest)| meets_difficulty(digest, difficulty));

            if let Some((nonce, digest)) = found {
                return Ok(MiningOutcome {
                    nonce,
                    digest,
                    attempts: nonce + 1,
                });
            }

            if limits.timeout.is_some_and(|timeout| started.elapsed() >= timeout) {
                return Err(ChainError::MiningAborted { attempts: end });
            }
            if end / PROGRESS_INTERVAL != start / PROGRESS_INTERVAL {
                debug!("Block {}: {} nonces tried on {} threads", header.index, end, limits.threads);
            }
            start = end;
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{HexDigest, Sha256Hasher, SimulatedHasher};
    use crate::transaction::Transaction;
    use std::time::Duration;

    fn candidate(hasher: &dyn ChainHasher) -> CandidateBlock {
        CandidateBlock::with_timestamp(
            hasher,
            1,
            HexDigest::new("0"),
            vec![Transaction::raw("Alice->Bob:1"), Transaction::raw("Charlie->Dave:2")],
            1_700_000_000_000,
        )
    }

    #[test]
    fn test_meets_difficulty() {
        let digest = HexDigest::new("00a1");
        assert!(meets_difficulty(&digest, 0));
        assert!(meets_difficulty(&digest, 1));
        assert!(meets_difficulty(&digest, 2));
        assert!(!meets_difficulty(&digest, 3));
        assert!(!meets_difficulty(&HexDigest::new("0000"), 5));
    }

    #[test]
    fn test_zero_difficulty_seals_with_nonce_zero() {
        let hasher = Sha256Hasher;
        let block = seal(&hasher, candidate(&hasher), 0, &MiningLimits::default()).unwrap();
        assert_eq!(block.nonce(), Some(0));
        assert_eq!(block.digest(), &block.recompute_digest(&hasher));
    }

    #[test]
    fn test_sealed_digest_meets_difficulty() {
        let hasher = Sha256Hasher;
        let block = seal(&hasher, candidate(&hasher), 2, &MiningLimits::default()).unwrap();
        assert!(block.digest().as_str().starts_with("00"));
        assert_eq!(block.digest(), &block.recompute_digest(&hasher));
        assert_eq!(block.proof().difficulty(), Some(2));
        assert!(block.consensus_info().starts_with("PoW(nonce="));
    }

    #[test]
    fn test_sequential_search_finds_lowest_nonce() {
        let hasher = Sha256Hasher;
        let c = candidate(&hasher);
        let outcome = mine(&hasher, c.header(), 2, &MiningLimits::default()).unwrap();
        assert_eq!(outcome.attempts, outcome.nonce + 1);
        for nonce in 0..outcome.nonce {
            assert!(!meets_difficulty(&c.header().digest(&hasher, Some(nonce)), 2));
        }
    }

    #[test]
    fn test_parallel_search_matches_sequential() {
        let hasher = Sha256Hasher;
        let c = candidate(&hasher);
        let sequential = mine(&hasher, c.header(), 3, &MiningLimits::default()).unwrap();
        let parallel = mine(&hasher, c.header(), 3, &MiningLimits::default().with_threads(4)).unwrap();
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_simulated_hasher_can_be_mined() {
        let hasher = SimulatedHasher;
        let block = seal(&hasher, candidate(&hasher), 2, &MiningLimits::default()).unwrap();
        assert!(meets_difficulty(block.digest(), 2));
    }

    #[test]
    fn test_unsatisfiable_difficulty_fails_fast() {
        let hasher = Sha256Hasher;
        let result = seal(&hasher, candidate(&hasher), 65, &MiningLimits::default());
        assert_eq!(
            result.unwrap_err(),
            ChainError::UnsatisfiableDifficulty { difficulty: 65, digest_len: 64 }
        );
    }

    #[test]
    fn test_attempt_cap_aborts() {
        let hasher = Sha256Hasher;
        let limits = MiningLimits::default().with_max_attempts(5);
        let result = mine(&hasher, candidate(&hasher).header(), 64, &limits);
        assert_eq!(result.unwrap_err(), ChainError::MiningAborted { attempts: 5 });

        let parallel = mine(&hasher, candidate(&hasher).header(), 64, &limits.clone().with_threads(2));
        assert!(matches!(parallel, Err(ChainError::MiningAborted { .. })));
    }

    #[test]
    fn test_zero_attempt_cap_still_tries_nonce_zero() {
        let hasher = Sha256Hasher;
        let header = candidate(&hasher).header().clone();
        let zero_cap = MiningLimits {
            max_attempts: Some(0),
            ..MiningLimits::default()
        };
        let sequential = mine(&hasher, &header, 0, &zero_cap).unwrap();
        let parallel = mine(&hasher, &header, 0, &zero_cap.clone().with_threads(2)).unwrap();
        assert_eq!(sequential.nonce, 0);
        assert_eq!(sequential, parallel);

        let capped = mine(&hasher, &header, 64, &zero_cap.with_threads(2));
        assert_eq!(capped.unwrap_err(), ChainError::MiningAborted { attempts: 1 });
    }

    #[test]
    fn test_timeout_aborts() {
        let hasher = Sha256Hasher;
        let limits = MiningLimits::default().with_timeout(Duration::from_millis(10));
        let result = mine(&hasher, candidate(&hasher).header(), 64, &limits);
        assert!(matches!(result, Err(ChainError::MiningAborted { .. })));
    }
}
