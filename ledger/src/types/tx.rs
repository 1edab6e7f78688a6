// ledger/src/types/tx.rs

//! Transaction types.
//!
//! A [`Transaction`] is a plain value transfer record. There is no
//! signature and no balance accounting; the ledger only orders and seals
//! what it is given.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Number;

use super::NodeId;

/// Sender used for the mining reward transaction ("minted from nothing").
pub const REWARD_SENDER: &str = "0";

/// Amount carried by a transaction.
///
/// Callers may submit either a JSON number (`5`, `0.25`) or a free-form
/// string (`"0.77btc"`). The value is kept exactly as submitted so the
/// canonical block encoding, and therefore the block hash, is stable.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    Number(Number),
    Text(String),
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Amount::Number(Number::from(value))
    }
}

impl From<&str> for Amount {
    fn from(value: &str) -> Self {
        Amount::Text(value.to_string())
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Amount::Number(n) => write!(f, "{n}"),
            Amount::Text(s) => f.write_str(s),
        }
    }
}

/// A single transfer recorded in a block.
///
/// Immutable once sealed; order within a block is submission order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub sender: String,
    pub recipient: String,
    pub amount: Amount,
}

impl Transaction {
    pub fn new(
        sender: impl Into<String>,
        recipient: impl Into<String>,
        amount: impl Into<Amount>,
    ) -> Self {
        Self {
            sender: sender.into(),
            recipient: recipient.into(),
            amount: amount.into(),
        }
    }

    /// Builds the reward credited to `miner` when it seals a block.
    pub fn reward(miner: &NodeId, amount: u64) -> Self {
        Self::new(REWARD_SENDER, miner.as_str(), amount)
    }

    /// Returns `true` if this is a mining reward.
    pub fn is_reward(&self) -> bool {
        self.sender == REWARD_SENDER
    }
}
