//! Top-level configuration for a ledger node.
//!
//! This module aggregates configuration for:
//!
//! - consensus parameters (`ConsensusConfig`),
//! - the HTTP client used to fetch peer chains (`PeerClientConfig`),
//! - the metrics exporter (enable flag + listen address).
//!
//! Binaries construct a `NodeConfig` from defaults and override individual
//! fields from their own configuration sources.

use std::net::SocketAddr;
use std::time::Duration;

use crate::consensus::ConsensusConfig;

/// Configuration for the peer chain client.
#[derive(Clone, Debug)]
pub struct PeerClientConfig {
    /// Upper bound on a single peer chain request, connect included.
    pub timeout: Duration,
}

impl Default for PeerClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
        }
    }
}

/// Configuration for the Prometheus metrics exporter.
#[derive(Clone, Debug)]
pub struct MetricsConfig {
    /// Whether to run a `/metrics` HTTP exporter.
    pub enabled: bool,
    /// Address to bind the metrics HTTP server to.
    pub listen_addr: SocketAddr,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 9898)),
        }
    }
}

/// Top-level configuration for a ledger node.
#[derive(Clone, Debug, Default)]
pub struct NodeConfig {
    pub consensus: ConsensusConfig,
    pub peer_client: PeerClientConfig,
    pub metrics: MetricsConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_node() {
        let cfg = NodeConfig::default();
        assert_eq!(cfg.consensus.difficulty, 4);
        assert_eq!(cfg.consensus.genesis_proof, 100);
        assert_eq!(cfg.consensus.mining_reward, 1);
        assert_eq!(cfg.peer_client.timeout, Duration::from_secs(5));
        assert_eq!(cfg.metrics.listen_addr.port(), 9898);
    }
}
