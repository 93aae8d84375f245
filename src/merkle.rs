//! Merkle root over an ordered batch of leaves.
//!
//! Levels are reduced pairwise, left then right. A level with an odd number of
//! nodes pairs its last node with a copy of itself. An empty batch commits to
//! the digest of the sentinel leaf [`EMPTY_LEAF`].

use crate::crypto::{ChainHasher, HexDigest};
use crate::transaction::Transaction;

/// Leaf committed in place of an empty batch.
pub const EMPTY_LEAF: &str = "empty";

/// Compute the root of an ordered sequence of raw leaves.
pub fn compute_root<L: AsRef<[u8]>>(hasher: &dyn ChainHasher, leaves: &[L]) -> HexDigest {
    let level: Vec<HexDigest> = leaves.iter().map(|leaf| hasher.digest(leaf.as_ref())).collect();
    reduce(hasher, level)
}

/// Root over the canonical strings of a transaction batch.
pub fn compute_transactions_root(hasher: &dyn ChainHasher, transactions: &[Transaction]) -> HexDigest {
    let level: Vec<HexDigest> = transactions.iter().map(|tx| tx.leaf_digest(hasher)).collect();
    reduce(hasher, level)
}

fn reduce(hasher: &dyn ChainHasher, mut level: Vec<HexDigest>) -> HexDigest {
    if level.is_empty() {
        return hasher.digest(EMPTY_LEAF.as_bytes());
    }

    while level.len() > 1 {
        level = level
            .chunks(2)
            .map(|pair| match pair {
                [left, right] => hasher.digest_pair(left, right),
                [last] => hasher.digest_pair(last, last),
                _ => unreachable!("chunks(2) yields one or two nodes"),
            })
            .collect();
    }

    // The loop leaves exactly one node.
    level.swap_remove(0)
}
