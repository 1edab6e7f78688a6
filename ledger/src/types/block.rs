// ledger/src/types/block.rs

//! Block types and hashing.
//!
//! A block's hash is the SHA-256 digest of its canonical JSON encoding
//! (see [`super::canonical_json`]): keys sorted at every depth, compact
//! separators. Chain validation recomputes these hashes and compares
//! them byte-for-byte, so every node must produce the same encoding for
//! the same logical block.

use serde::{Deserialize, Serialize};

use super::{BlockHash, Transaction, canonical_json, sha256_hex};

/// A sealed ledger entry.
///
/// Blocks are immutable once appended. `index` is 1-based and increases
/// by one along the chain; `previous_hash` links to the predecessor (or
/// holds the genesis sentinel for the first block).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Position in the chain, starting at 1 for genesis.
    pub index: u64,

    /// Wall-clock sealing time in seconds since the Unix epoch.
    pub timestamp: f64,

    /// Transactions in submission order, the mining reward last.
    pub transactions: Vec<Transaction>,

    /// Proof-of-work solution relative to the previous block's proof.
    pub proof: u64,

    /// Hash of the previous block, or [`BlockHash::genesis`].
    pub previous_hash: BlockHash,
}

impl Block {
    /// Builds the genesis block.
    pub fn genesis(proof: u64, timestamp: f64) -> Self {
        Self {
            index: 1,
            timestamp,
            transactions: Vec::new(),
            proof,
            previous_hash: BlockHash::genesis(),
        }
    }

    /// Returns the canonical byte representation of this block.
    ///
    /// All hashing goes through this method so the encoding cannot drift
    /// between the miner and the validator.
    ///
    /// # Panics
    ///
    /// Panics if the block cannot be represented as a JSON value. This is
    /// a programming error: every field is a string, number or sequence.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let value =
            serde_json::to_value(self).expect("Block should always convert to a JSON value");
        canonical_json(&value)
    }

    /// Computes the SHA-256 hash of the canonical encoding.
    pub fn compute_hash(&self) -> BlockHash {
        BlockHash(sha256_hex(&self.canonical_bytes()))
    }

    pub fn is_genesis(&self) -> bool {
        self.previous_hash.is_genesis_sentinel()
    }
}

/// Full chain as reported by a node (`GET /chain`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChainSummary {
    pub chain: Vec<Block>,
    /// Number of blocks in `chain`. Decoding also accepts the key `total`;
    /// the alias covers this field only, blocks must use the encoding above.
    #[serde(alias = "total")]
    pub length: u64,
}

impl ChainSummary {
    pub fn new(chain: Vec<Block>) -> Self {
        let length = chain.len() as u64;
        Self { chain, length }
    }

    /// Returns `true` if the reported length matches the blocks carried.
    pub fn is_consistent(&self) -> bool {
        self.length == self.chain.len() as u64
    }
}
