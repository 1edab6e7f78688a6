//! Core domain types used by the ledger.
//!
//! This module defines the block hash and node identifier newtypes, the
//! SHA-256 helper every hash in the ledger goes through, and the
//! canonical JSON encoding that block hashing depends on. Public APIs use
//! these wrappers instead of naked strings.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

pub mod block;
pub mod tx;

pub use block::{Block, ChainSummary};
pub use tx::{Amount, REWARD_SENDER, Transaction};

/// Literal used as the genesis block's `previous_hash`.
///
/// It is never the output of [`sha256_hex`] (which is always 64 hex
/// characters), so it cannot collide with a real block hash.
pub const GENESIS_PREVIOUS_HASH: &str = "1";

/// Returns the lowercase hex SHA-256 digest of `data`.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Strongly-typed block hash.
///
/// Holds the lowercase hex SHA-256 digest of a block's canonical
/// encoding, or the genesis sentinel (see [`BlockHash::genesis`]).
#[derive(Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockHash(pub String);

impl BlockHash {
    /// The "no predecessor" marker carried by the genesis block.
    pub fn genesis() -> Self {
        BlockHash(GENESIS_PREVIOUS_HASH.to_string())
    }

    /// Returns `true` if this is the genesis sentinel rather than a digest.
    pub fn is_genesis_sentinel(&self) -> bool {
        self.0 == GENESIS_PREVIOUS_HASH
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BlockHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of this node, used as the recipient of mining rewards.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        NodeId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Encodes a JSON value canonically: object keys in ascending byte order
/// at every depth, no insignificant whitespace.
///
/// Key order is rebuilt explicitly rather than relying on the map type
/// `serde_json` happens to be compiled with, so enabling `preserve_order`
/// anywhere in the dependency graph cannot change block hashes.
pub fn canonical_json(value: &Value) -> Vec<u8> {
    let sorted = sort_keys(value);
    // Writing a `Value` into a `Vec` has no failure mode.
    serde_json::to_vec(&sorted).unwrap_or_default()
}

fn sort_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            let mut sorted = Map::new();
            for (k, v) in entries {
                sorted.insert(k.clone(), sort_keys(v));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_keys).collect()),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sha256_hex_matches_known_vector() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn genesis_sentinel_is_not_a_digest() {
        let sentinel = BlockHash::genesis();
        assert!(sentinel.is_genesis_sentinel());
        assert_ne!(sentinel.as_str().len(), sha256_hex(b"").len());

        let real = BlockHash(sha256_hex(b"block"));
        assert!(!real.is_genesis_sentinel());
    }

    #[test]
    fn canonical_json_ignores_insertion_order() {
        let mut a = Map::new();
        a.insert("zeta".into(), json!(1));
        a.insert("alpha".into(), json!({"y": 2, "x": [ {"b": 1, "a": 0} ]}));

        let mut b = Map::new();
        b.insert("alpha".into(), json!({"x": [ {"a": 0, "b": 1} ], "y": 2}));
        b.insert("zeta".into(), json!(1));

        let ca = canonical_json(&Value::Object(a));
        let cb = canonical_json(&Value::Object(b));
        assert_eq!(ca, cb);
        assert_eq!(
            String::from_utf8(ca).unwrap(),
            r#"{"alpha":{"x":[{"a":0,"b":1}],"y":2},"zeta":1}"#
        );
    }
}
