//! API gateway configuration.
//!
//! The gateway configures its HTTP listen address and node identity; the
//! underlying ledger configuration starts from `ledger::NodeConfig` and
//! accepts a difficulty override. Every knob can be set from the
//! environment:
//!
//! - `LEDGER_LISTEN_ADDR` (default `0.0.0.0:5000`)
//! - `LEDGER_NODE_ID` (default: a fresh dash-less UUID)
//! - `LEDGER_DIFFICULTY` (default: `ConsensusConfig::default().difficulty`)

use std::net::SocketAddr;

use ledger::NodeConfig;

pub const LISTEN_ADDR_VAR: &str = "LEDGER_LISTEN_ADDR";
pub const NODE_ID_VAR: &str = "LEDGER_NODE_ID";
pub const DIFFICULTY_VAR: &str = "LEDGER_DIFFICULTY";

/// Configuration for the API gateway HTTP server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP server to.
    pub listen_addr: SocketAddr,
    /// Recipient of this node's mining rewards.
    pub node_id: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 5000)),
            node_id: uuid::Uuid::new_v4().simple().to_string(),
        }
    }
}

impl ApiConfig {
    /// Builds the configuration from process environment variables.
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let mut cfg = Self::default();

        if let Some(addr) = lookup(LISTEN_ADDR_VAR) {
            cfg.listen_addr = addr
                .trim()
                .parse()
                .map_err(|e| format!("invalid {LISTEN_ADDR_VAR} {addr:?}: {e}"))?;
        }

        if let Some(id) = lookup(NODE_ID_VAR) {
            let id = id.trim();
            if id.is_empty() {
                return Err(format!("{NODE_ID_VAR} must not be empty"));
            }
            cfg.node_id = id.to_string();
        }

        Ok(cfg)
    }
}

/// Ledger node configuration with environment overrides applied.
pub fn node_config_from_env() -> Result<NodeConfig, String> {
    node_config_from_lookup(|key| std::env::var(key).ok())
}

pub fn node_config_from_lookup(
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<NodeConfig, String> {
    let mut cfg = NodeConfig::default();

    if let Some(raw) = lookup(DIFFICULTY_VAR) {
        cfg.consensus.difficulty = raw
            .trim()
            .parse()
            .map_err(|e| format!("invalid {DIFFICULTY_VAR} {raw:?}: {e}"))?;
    }

    Ok(cfg)
}
