//! Ledger library crate.
//!
//! This crate provides the building blocks of a minimal proof-of-work
//! ledger node:
//!
//! - block and transaction types with canonical SHA-256 hashing (`types`),
//! - proof-of-work, chain validation and consensus (`consensus`),
//! - the shared in-memory ledger with optimistic mining (`engine`),
//! - the peer registry (`peers`) and HTTP chain fetcher (`peer_client`),
//! - Prometheus-based metrics (`metrics`),
//! - and a top-level node configuration (`config`).
//!
//! The `api-gateway` binary composes these pieces into an HTTP node.

pub mod config;
pub mod consensus;
pub mod engine;
pub mod metrics;
pub mod peer_client;
pub mod peers;
pub mod types;

// Re-export top-level configuration types.
pub use config::{MetricsConfig, NodeConfig, PeerClientConfig};

// Re-export "core" consensus types and traits.
pub use consensus::{
    ChainFetcher, ChainValidator, ConsensusConfig, ConsensusResolver, FetchError, LedgerError,
    ProofOfWork, ProofOfWorkValidator, Resolution, StopSignal, ValidationError,
};

pub use engine::Ledger;
pub use peer_client::HttpChainFetcher;
pub use peers::{PeerRegistry, network_location};

// Re-export metrics registry and ledger metrics.
pub use metrics::{LedgerMetrics, MetricsRegistry, run_prometheus_http_server};

// Re-export domain types at the crate root for convenience.
pub use types::*;

/// Type alias for the resolver a networked node uses: proof-of-work
/// validation over HTTP-fetched peer chains.
pub type DefaultResolver = ConsensusResolver<ProofOfWorkValidator, HttpChainFetcher>;
