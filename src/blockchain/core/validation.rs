use crate::blockchain::core::block::Block;
use crate::consensus::pow::meets_difficulty;
use crate::consensus::ConsensusProof;
use crate::crypto::ChainHasher;
use crate::error::{ChainError, Result};
use crate::merkle::compute_transactions_root;

/// Check that every block after the first records its predecessor's digest.
///
/// An empty or single-block sequence is trivially linked.
pub fn validate_linkage(blocks: &[Block]) -> Result<()> {
    for (index, pair) in blocks.windows(2).enumerate() {
        let (previous, current) = (&pair[0], &pair[1]);
        if current.previous_digest() != previous.digest() {
            return Err(ChainError::LinkageBroken { index: index + 1 });
        }
    }
    Ok(())
}

/// Check a block against its own fields: position, Merkle root, stored digest
/// and, for Proof-of-Work, the recorded difficulty.
pub fn verify_block(hasher: &dyn ChainHasher, block: &Block, position: usize) -> Result<()> {
    if block.index() != position as u64 {
        return Err(ChainError::IndexMismatch {
            index: position,
            found: block.index(),
        });
    }

    if compute_transactions_root(hasher, block.transactions()) != *block.merkle_root() {
        return Err(ChainError::MerkleRootMismatch { index: position });
    }

    if block.recompute_digest(hasher) != *block.digest() {
        return Err(ChainError::DigestMismatch { index: position });
    }

    if let ConsensusProof::ProofOfWork { difficulty, .. } = block.proof() {
        if !meets_difficulty(block.digest(), *difficulty) {
            return Err(ChainError::InsufficientWork {
                index: position,
                difficulty: *difficulty,
            });
        }
    }

    Ok(())
}

/// Full verification, reporting the earliest broken block.
pub fn verify_chain(hasher: &dyn ChainHasher, blocks: &[Block]) -> Result<()> {
    for (position, block) in blocks.iter().enumerate() {
        verify_block(hasher, block, position)?;
        if position > 0 && block.previous_digest() != blocks[position - 1].digest() {
            return Err(ChainError::LinkageBroken { index: position });
        }
    }
    Ok(())
}
