//! Helpers shared by the command-line driver

use crate::blockchain::{Block, Blockchain};
use crate::config::{load_config, Config};
use crate::consensus::ConsensusProof;
use crate::error::Result;
use crate::transaction::Transaction;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use rand::seq::SliceRandom;
use rand::Rng;
use std::path::Path;

pub const SAMPLE_USERS: [&str; 5] = ["Alice", "Bob", "Charlie", "Dave", "Eve"];

/// Load and validate the configuration, then build a fresh chain from it.
pub fn load_blockchain_from_config(path: impl AsRef<Path>) -> Result<(Config, Blockchain)> {
    let config = load_config(path)?;
    let chain = Blockchain::from_config(&config);
    Ok((config, chain))
}

/// Random transfers between the sample users, never to oneself.
pub fn sample_transactions<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Vec<Transaction> {
    (0..count)
        .map(|_| {
            let mut pair = SAMPLE_USERS.choose_multiple(rng, 2);
            let sender = pair.next().copied().unwrap_or("Alice");
            let receiver = pair.next().copied().unwrap_or("Bob");
            let amount = rng.gen_range(0.1..10.0);
            Transaction::transfer(sender, receiver, amount)
        })
        .collect()
}

/// Short proof column: nonce for PoW, elected validator for PoS.
pub fn proof_summary(block: &Block) -> String {
    match block.proof() {
        ConsensusProof::Genesis => "-".to_string(),
        ConsensusProof::ProofOfWork { nonce, .. } => format!("nonce {}", nonce),
        ConsensusProof::ProofOfStake { validator_id } => format!("validator {}", validator_id),
    }
}

pub fn render_chain_table(chain: &Blockchain) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["#", "Digest", "Previous", "Merkle root", "Txs", "Consensus", "Proof"]);

    for block in chain.blocks() {
        table.add_row(vec![
            block.index().to_string(),
            block.digest().short(12),
            block.previous_digest().short(12),
            block.merkle_root().short(12),
            block.transactions().len().to_string(),
            block.consensus_info(),
            proof_summary(block),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consensus::Validator;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_sample_transactions_are_well_formed() {
        let mut rng = StdRng::seed_from_u64(7);
        let txs = sample_transactions(&mut rng, 25);
        assert_eq!(txs.len(), 25);
        for tx in txs {
            match tx {
                Transaction::Transfer(t) => {
                    assert_ne!(t.sender, t.receiver);
                    assert!(SAMPLE_USERS.contains(&t.sender.as_str()));
                    assert!(SAMPLE_USERS.contains(&t.receiver.as_str()));
                    assert!((0.1..10.0).contains(&t.amount));
                }
                Transaction::Raw(_) => panic!("expected transfers"),
            }
        }
    }

    #[test]
    fn test_chain_table_has_row_per_block() {
        let mut chain = Blockchain::new(1);
        chain.set_validators(vec![Validator::new("A", 1)]);
        chain.append_pow(vec![Transaction::raw("x")]).unwrap();
        chain.append_pos(vec![]).unwrap();

        let table = render_chain_table(&chain);
        assert_eq!(table.row_iter().count(), 3);
        let rendered = table.to_string();
        assert!(rendered.contains("Base/Genesis"));
        assert!(rendered.contains("validator A"));
    }

    #[test]
    fn test_load_blockchain_from_missing_config() {
        let dir = tempfile::tempdir().unwrap();
        let (config, chain) = load_blockchain_from_config(dir.path().join("none.toml")).unwrap();
        assert_eq!(chain.difficulty(), config.consensus.pow_difficulty);
        assert_eq!(chain.validators(), config.validators.as_slice());
        assert_eq!(chain.len(), 1);
    }
}
