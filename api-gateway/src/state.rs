//! Shared application state.

use std::sync::Arc;

use ledger::{
    DefaultResolver, HttpChainFetcher, Ledger, MetricsRegistry, NodeConfig, NodeId,
    PeerRegistry, ProofOfWorkValidator, StopSignal,
};

/// Shared state held by the API and background tasks.
///
/// This is wrapped in an [`Arc`] and passed to request handlers via Axum's
/// `State` extractor.
pub struct AppState {
    /// The node's chain and pending pool. Held in its own `Arc` so mining
    /// can move a handle onto the blocking pool.
    pub ledger: Arc<Ledger>,
    /// Known peers.
    pub peers: PeerRegistry,
    /// Longest-valid-chain resolver over HTTP-fetched peer chains.
    pub resolver: DefaultResolver,
    /// Raised on shutdown; aborts in-flight proof searches.
    pub stop: StopSignal,
    /// Metrics registry shared between mining, consensus and the exporter.
    pub metrics: Arc<MetricsRegistry>,
}

impl AppState {
    pub fn new(
        cfg: &NodeConfig,
        node_id: NodeId,
        metrics: Arc<MetricsRegistry>,
    ) -> Result<Self, String> {
        let fetcher = HttpChainFetcher::from_config(&cfg.peer_client)
            .map_err(|e| format!("failed to create peer client: {e}"))?;
        let validator = ProofOfWorkValidator::from_config(&cfg.consensus);
        let ledger = Arc::new(Ledger::new(cfg.consensus.clone(), node_id));
        metrics.ledger.chain_length.set(ledger.len() as i64);

        Ok(Self {
            ledger,
            peers: PeerRegistry::new(),
            resolver: DefaultResolver::new(validator, fetcher),
            stop: StopSignal::new(),
            metrics,
        })
    }
}

/// Thread-safe alias for `AppState`.
pub type SharedState = Arc<AppState>;
