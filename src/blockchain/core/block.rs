use crate::consensus::ConsensusProof;
use crate::crypto::{ChainHasher, HexDigest};
use crate::merkle::compute_transactions_root;
use crate::transaction::Transaction;
use serde::Serialize;

/// Previous digest recorded by the genesis block.
pub const GENESIS_PREVIOUS_DIGEST: &str = "0";
/// Fixed genesis timestamp so every chain starts from the same block.
pub const GENESIS_TIMESTAMP: u64 = 1672531200000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockHeader {
    pub index: u64,
    pub previous_digest: HexDigest,
    pub merkle_root: HexDigest,
    /// Unix milliseconds.
    pub timestamp: u64,
}

impl BlockHeader {
    /// `index ++ previous_digest ++ merkle_root ++ timestamp [++ nonce]`
    pub fn canonical_fields(&self, nonce: Option<u64>) -> String {
        let mut data = format!(
            "{}{}{}{}",
            self.index, self.previous_digest, self.merkle_root, self.timestamp
        );
        if let Some(nonce) = nonce {
            data.push_str(&nonce.to_string());
        }
        data
    }

    pub fn digest(&self, hasher: &dyn ChainHasher, nonce: Option<u64>) -> HexDigest {
        hasher.digest(self.canonical_fields(nonce).as_bytes())
    }
}

/// A block that has been assembled but not yet finalized by a consensus
/// strategy.
///
/// The creation timestamp is part of the digest, so two candidates over the
/// same transactions built at different instants seal to different digests
/// (and usually to a different nonce or validator).
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateBlock {
    pub(crate) header: BlockHeader,
    pub(crate) transactions: Vec<Transaction>,
}

impl CandidateBlock {
    pub fn new(
        hasher: &dyn ChainHasher,
        index: u64,
        previous_digest: HexDigest,
        transactions: Vec<Transaction>,
    ) -> Self {
        let timestamp = chrono::Utc::now().timestamp_millis() as u64;
        Self::with_timestamp(hasher, index, previous_digest, transactions, timestamp)
    }

    pub fn with_timestamp(
        hasher: &dyn ChainHasher,
        index: u64,
        previous_digest: HexDigest,
        transactions: Vec<Transaction>,
        timestamp: u64,
    ) -> Self {
        let merkle_root = compute_transactions_root(hasher, &transactions);
        CandidateBlock {
            header: BlockHeader {
                index,
                previous_digest,
                merkle_root,
                timestamp,
            },
            transactions,
        }
    }

    pub fn header(&self) -> &BlockHeader {
        &self.header
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Digest over the header fields alone, with no consensus proof.
    pub fn base_digest(&self, hasher: &dyn ChainHasher) -> HexDigest {
        self.header.digest(hasher, None)
    }

    pub(crate) fn seal(self, proof: ConsensusProof, digest: HexDigest) -> Block {
        Block {
            header: self.header,
            transactions: self.transactions,
            proof,
            digest,
        }
    }
}

/// A finalized block. Immutable once appended to a chain.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Block {
    pub(crate) header: BlockHeader,
    pub(crate) transactions: Vec<Transaction>,
    pub(crate) proof: ConsensusProof,
    pub(crate) digest: HexDigest,
}

impl Block {
    pub fn genesis(hasher: &dyn ChainHasher) -> Self {
        let candidate = CandidateBlock::with_timestamp(
            hasher,
            0,
            HexDigest::new(GENESIS_PREVIOUS_DIGEST),
            Vec::new(),
            GENESIS_TIMESTAMP,
        );
        let digest = candidate.base_digest(hasher);
        candidate.seal(ConsensusProof::Genesis, digest)
    }

    pub fn header(&self) -> &BlockHeader {
        &self.header
    }

    pub fn index(&self) -> u64 {
        self.header.index
    }

    pub fn previous_digest(&self) -> &HexDigest {
        &self.header.previous_digest
    }

    pub fn merkle_root(&self) -> &HexDigest {
        &self.header.merkle_root
    }

    pub fn timestamp(&self) -> u64 {
        self.header.timestamp
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn proof(&self) -> &ConsensusProof {
        &self.proof
    }

    pub fn digest(&self) -> &HexDigest {
        &self.digest
    }

    pub fn nonce(&self) -> Option<u64> {
        self.proof.nonce()
    }

    pub fn validator_id(&self) -> Option<&str> {
        self.proof.validator_id()
    }

    /// Human readable consensus descriptor, e.g. `PoW(nonce=12, difficulty=2)`.
    pub fn consensus_info(&self) -> String {
        self.proof.to_string()
    }

    pub fn canonical_fields(&self) -> String {
        self.header.canonical_fields(self.proof.nonce())
    }

    /// Digest recomputed from the block's current fields.
    pub fn recompute_digest(&self, hasher: &dyn ChainHasher) -> HexDigest {
        self.header.digest(hasher, self.proof.nonce())
    }

    pub fn timestamp_utc(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        chrono::DateTime::from_timestamp_millis(self.header.timestamp as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Sha256Hasher;

    #[test]
    fn test_genesis_block_is_fixed() {
        let hasher = Sha256Hasher;
        let a = Block::genesis(&hasher);
        let b = Block::genesis(&hasher);
        assert_eq!(a, b);
        assert_eq!(a.index(), 0);
        assert_eq!(a.previous_digest().as_str(), GENESIS_PREVIOUS_DIGEST);
        assert_eq!(a.merkle_root(), &hasher.digest(b"empty"));
        assert_eq!(a.consensus_info(), "Base/Genesis");
        assert_eq!(a.digest(), &a.recompute_digest(&hasher));
    }

    #[test]
    fn test_canonical_fields_layout() {
        let header = BlockHeader {
            index: 3,
            previous_digest: HexDigest::new("ab"),
            merkle_root: HexDigest::new("cd"),
            timestamp: 42,
        };
        assert_eq!(header.canonical_fields(None), "3abcd42");
        assert_eq!(header.canonical_fields(Some(7)), "3abcd427");
    }

    #[test]
    fn test_candidate_commits_to_transactions() {
        let hasher = Sha256Hasher;
        let txs = vec![Transaction::raw("Alice->Bob:1")];
        let candidate = CandidateBlock::with_timestamp(&hasher, 1, HexDigest::new("0"), txs.clone(), 1000);
        assert_eq!(candidate.header().merkle_root, crate::merkle::compute_transactions_root(&hasher, &txs));
        assert_eq!(candidate.transactions(), txs.as_slice());
    }

    #[test]
    fn test_timestamp_changes_base_digest() {
        let hasher = Sha256Hasher;
        let txs = vec![Transaction::raw("Alice->Bob:1")];
        let early = CandidateBlock::with_timestamp(&hasher, 1, HexDigest::new("0"), txs.clone(), 1000);
        let late = CandidateBlock::with_timestamp(&hasher, 1, HexDigest::new("0"), txs, 1001);
        assert_ne!(early.base_digest(&hasher), late.base_digest(&hasher));
    }

    #[test]
    fn test_timestamp_utc_conversion() {
        let genesis = Block::genesis(&Sha256Hasher);
        let dt = genesis.timestamp_utc().expect("valid timestamp");
        assert_eq!(dt.format("%Y-%m-%d").to_string(), "2023-01-01");
    }
}
