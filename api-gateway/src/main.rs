// api-gateway/src/main.rs

//! API gateway binary.
//!
//! This binary exposes a ledger node over HTTP on top of the `ledger`
//! crate:
//!
//! - `GET /health`
//! - `GET /chain`
//! - `POST /transactions/new`
//! - `POST /mine`
//! - `POST /nodes/register`
//! - `GET /nodes/resolve`
//!
//! It embeds a single in-memory `Ledger`, a peer registry, a background
//! consensus loop, and a Prometheus metrics exporter on `/metrics`.

mod config;
mod error;
mod routes;
mod state;

use std::sync::Arc;
use std::time::Duration;

use tokio::signal;
use tracing_subscriber::EnvFilter;

use config::ApiConfig;
use ledger::{MetricsRegistry, NodeId, StopSignal, run_prometheus_http_server};
use state::{AppState, SharedState};

#[tokio::main]
async fn main() {
    // Basic tracing setup.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("api_gateway=info,ledger=info")),
        )
        .init();

    if let Err(e) = run().await {
        tracing::error!("fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), String> {
    let api_cfg = ApiConfig::from_env()?;
    let node_cfg = config::node_config_from_env()?;

    // ---------------------------
    // Metrics
    // ---------------------------

    let metrics = Arc::new(
        MetricsRegistry::new()
            .map_err(|e| format!("failed to initialise metrics registry: {e}"))?,
    );

    if node_cfg.metrics.enabled {
        let metrics_clone = metrics.clone();
        let addr = node_cfg.metrics.listen_addr;
        tokio::spawn(async move {
            if let Err(e) = run_prometheus_http_server(metrics_clone, addr).await {
                tracing::error!("metrics HTTP server error: {e}");
            }
        });
        tracing::info!("metrics exporter listening on http://{}/metrics", addr);
    }

    // ---------------------------
    // Ledger, peers, resolver
    // ---------------------------

    let app_state: SharedState = Arc::new(AppState::new(
        &node_cfg,
        NodeId::new(api_cfg.node_id.clone()),
        metrics,
    )?);

    tracing::info!(
        node_id = %api_cfg.node_id,
        difficulty = node_cfg.consensus.difficulty,
        "ledger initialised with genesis block"
    );

    // ---------------------------
    // Consensus loop
    // ---------------------------

    let sync_interval_secs = node_cfg.consensus.sync_interval_secs;
    if sync_interval_secs > 0 {
        let sync_state = app_state.clone();
        tokio::spawn(async move {
            run_consensus_loop(sync_state, sync_interval_secs).await;
        });
    }

    // ---------------------------
    // HTTP router + axum server
    // ---------------------------

    let app = routes::router(app_state.clone());

    tracing::info!("API gateway listening on http://{}", api_cfg.listen_addr);

    let listener = tokio::net::TcpListener::bind(api_cfg.listen_addr)
        .await
        .map_err(|e| format!("failed to bind {}: {e}", api_cfg.listen_addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(app_state.stop.clone()))
        .await
        .map_err(|e| format!("API server error: {e}"))?;

    Ok(())
}

/// Background consensus loop.
///
/// Periodically resolves conflicts against every registered peer, the same
/// way `GET /nodes/resolve` does.
async fn run_consensus_loop(state: SharedState, interval_secs: u64) {
    let interval = Duration::from_secs(interval_secs);
    tracing::info!(
        "consensus loop running with interval {}s",
        interval.as_secs()
    );

    loop {
        tokio::time::sleep(interval).await;
        if state.stop.is_stopped() {
            break;
        }

        let peers = state.peers.peers();
        if peers.is_empty() {
            continue;
        }

        let outcome = state.resolver.resolve(&state.ledger, &peers).await;
        state.metrics.ledger.record_resolution(&outcome);
        if outcome.replaced {
            tracing::info!(
                length = outcome.length,
                source = outcome.source.as_deref().unwrap_or_default(),
                "background consensus adopted peer chain"
            );
        }
    }
}

/// Waits for Ctrl-C, aborts in-flight mining and returns, used for
/// graceful shutdown.
async fn shutdown_signal(stop: StopSignal) {
    let _ = signal::ctrl_c().await;
    stop.stop();
    tracing::info!("shutdown signal received");
}
