//! Digest functions for DualChain
//!
//! Every component hashes through the [`ChainHasher`] trait so the digest can be
//! swapped without touching Merkle, block or consensus code. The default is
//! SHA-256; [`SimulatedHasher`] is a non-cryptographic stand-in kept for
//! teaching and must never secure real value.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::Arc;

/// Lowercase hexadecimal digest string of fixed length.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HexDigest(String);

impl HexDigest {
    pub fn new(value: impl Into<String>) -> Self {
        HexDigest(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of leading `'0'` characters.
    pub fn leading_zeros(&self) -> usize {
        self.0.chars().take_while(|c| *c == '0').count()
    }

    /// Shortened form for display, e.g. `00ab12cd34...`.
    pub fn short(&self, width: usize) -> String {
        match self.0.char_indices().nth(width) {
            Some((cut, _)) => format!("{}...", &self.0[..cut]),
            None => self.0.clone(),
        }
    }
}

impl fmt::Display for HexDigest {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for HexDigest {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Deterministic, fixed-length digest over arbitrary bytes.
pub trait ChainHasher: Send + Sync + fmt::Debug {
    fn digest(&self, input: &[u8]) -> HexDigest;

    /// Length in characters of every digest this hasher produces.
    fn digest_len(&self) -> usize;

    fn name(&self) -> &'static str;

    /// Digest of the concatenation `left ++ right`.
    fn digest_pair(&self, left: &HexDigest, right: &HexDigest) -> HexDigest {
        let mut joined = String::with_capacity(left.len() + right.len());
        joined.push_str(left.as_str());
        joined.push_str(right.as_str());
        self.digest(joined.as_bytes())
    }
}

/// SHA-256 rendered as 64 hex characters.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Hasher;

impl ChainHasher for Sha256Hasher {
    fn digest(&self, input: &[u8]) -> HexDigest {
        HexDigest(hex::encode(Sha256::digest(input)))
    }

    fn digest_len(&self) -> usize {
        64
    }

    fn name(&self) -> &'static str {
        "sha256"
    }
}

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

fn fnv1a(parts: &[&[u8]]) -> u64 {
    let mut hash = FNV_OFFSET_BASIS;
    for part in parts {
        for byte in *part {
            hash ^= u64::from(*byte);
            hash = hash.wrapping_mul(FNV_PRIME);
        }
    }
    hash
}

/// SplitMix64 finalizer. FNV-1a alone barely touches the high bits when only
/// the trailing bytes change, which starves the leading-zero search.
fn avalanche(mut h: u64) -> u64 {
    h ^= h >> 30;
    h = h.wrapping_mul(0xbf58_476d_1ce4_e5b9);
    h ^= h >> 27;
    h = h.wrapping_mul(0x94d0_49bb_1331_11eb);
    h ^ (h >> 31)
}

fn mixed(parts: &[&[u8]]) -> u64 {
    avalanche(fnv1a(parts))
}

/// Four finalized FNV-1a hashes combined into a 64 character hex string.
///
/// Not collision resistant. Useful to show that nothing outside this module
/// depends on SHA-256.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedHasher;

impl ChainHasher for SimulatedHasher {
    fn digest(&self, input: &[u8]) -> HexDigest {
        let h1 = mixed(&[input]);
        let h2 = mixed(&[input, b"salt"]);
        let h3 = mixed(&[h1.to_string().as_bytes(), input]);
        let h4 = mixed(&[h2.to_string().as_bytes(), b"pepper"]);
        HexDigest(format!("{:016x}{:016x}{:016x}{:016x}", h1, h2, h3, h4))
    }

    fn digest_len(&self) -> usize {
        64
    }

    fn name(&self) -> &'static str {
        "simulated"
    }
}

/// Hasher selection as it appears in configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HasherKind {
    #[default]
    Sha256,
    Simulated,
}

impl HasherKind {
    pub fn build(self) -> Arc<dyn ChainHasher> {
        match self {
            HasherKind::Sha256 => Arc::new(Sha256Hasher),
            HasherKind::Simulated => Arc::new(SimulatedHasher),
        }
    }
}

/// Digest with the default hasher.
pub fn digest(input: impl AsRef<[u8]>) -> HexDigest {
    Sha256Hasher.digest(input.as_ref())
}
