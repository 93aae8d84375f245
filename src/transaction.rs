//! Transaction records committed by blocks
//!
//! The core never interprets a transaction: it only needs the canonical string
//! that becomes a Merkle leaf.

use crate::crypto::{ChainHasher, HexDigest};
use serde::{Deserialize, Serialize};

/// Length of the short transaction identifier, in hex characters.
pub const TX_ID_LEN: usize = 16;

/// A transaction that can occur in a block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Transaction {
    Transfer(TransferTx),
    Raw(String),
}

/// Value moved from one party to another
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferTx {
    pub sender: String,
    pub receiver: String,
    pub amount: f64,
}

impl Transaction {
    pub fn transfer(sender: impl Into<String>, receiver: impl Into<String>, amount: f64) -> Self {
        Transaction::Transfer(TransferTx {
            sender: sender.into(),
            receiver: receiver.into(),
            amount,
        })
    }

    pub fn raw(text: impl Into<String>) -> Self {
        Transaction::Raw(text.into())
    }

    /// Serialization used as the Merkle leaf.
    pub fn canonical_string(&self) -> String {
        match self {
            Transaction::Transfer(tx) => {
                format!("{}->{}:{:.6}", tx.sender, tx.receiver, tx.amount)
            }
            Transaction::Raw(text) => text.clone(),
        }
    }

    /// Short identifier derived from the transaction contents.
    pub fn id(&self, hasher: &dyn ChainHasher) -> String {
        let preimage = match self {
            Transaction::Transfer(tx) => {
                format!("{}{}{:.6}", tx.sender, tx.receiver, tx.amount)
            }
            Transaction::Raw(text) => text.clone(),
        };
        let digest = hasher.digest(preimage.as_bytes());
        digest.as_str()[..TX_ID_LEN.min(digest.len())].to_string()
    }

    pub fn leaf_digest(&self, hasher: &dyn ChainHasher) -> HexDigest {
        hasher.digest(self.canonical_string().as_bytes())
    }
}

impl From<&str> for Transaction {
    fn from(text: &str) -> Self {
        Transaction::raw(text)
    }
}

impl From<String> for Transaction {
    fn from(text: String) -> Self {
        Transaction::Raw(text)
    }
}
