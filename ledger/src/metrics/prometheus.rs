//! Prometheus-backed metrics and HTTP exporter.
//!
//! [`MetricsRegistry`] owns a Prometheus registry and the strongly-typed
//! ledger metrics; [`run_prometheus_http_server`] serves them over `hyper`.

use std::{convert::Infallible, net::SocketAddr, sync::Arc};

use bytes::Bytes;
use http_body_util::Full;
use hyper::{
    Method, Request, Response, StatusCode, body::Incoming, header::CONTENT_TYPE,
    header::HeaderValue, server::conn::http1, service::service_fn,
};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tracing::warn;

use prometheus::{
    self, Encoder, Histogram, HistogramOpts, IntCounter, IntGauge, Opts, Registry, TextEncoder,
};

use crate::consensus::Resolution;

/// Mining and consensus metrics.
#[derive(Clone)]
pub struct LedgerMetrics {
    /// Blocks sealed by this node.
    pub blocks_mined: IntCounter,
    /// Wall-clock time of a successful `mine_block` call, in seconds.
    pub mining_seconds: Histogram,
    /// Current number of blocks in the local chain.
    pub chain_length: IntGauge,
    /// Times consensus replaced the local chain.
    pub chain_replacements: IntCounter,
    /// Peer chain fetches that failed.
    pub peer_fetch_failures: IntCounter,
    /// Longer peer chains discarded as invalid or misreported.
    pub rejected_candidates: IntCounter,
}

impl LedgerMetrics {
    /// Registers ledger metrics into the given `Registry`.
    pub fn register(registry: &Registry) -> Result<Self, prometheus::Error> {
        let blocks_mined = IntCounter::with_opts(Opts::new(
            "blocks_mined_total",
            "Total number of blocks sealed by this node",
        ))?;
        registry.register(Box::new(blocks_mined.clone()))?;

        // Proof search dominates; buckets span easy test difficulties up
        // to multi-second searches.
        let mining_seconds = Histogram::with_opts(
            HistogramOpts::new("mining_seconds", "Time to solve and seal a block in seconds")
                .buckets(vec![
                    0.001, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0,
                ]),
        )?;
        registry.register(Box::new(mining_seconds.clone()))?;

        let chain_length = IntGauge::with_opts(Opts::new(
            "chain_length",
            "Number of blocks in the local chain",
        ))?;
        registry.register(Box::new(chain_length.clone()))?;

        let chain_replacements = IntCounter::with_opts(Opts::new(
            "chain_replacements_total",
            "Total number of times consensus replaced the local chain",
        ))?;
        registry.register(Box::new(chain_replacements.clone()))?;

        let peer_fetch_failures = IntCounter::with_opts(Opts::new(
            "peer_fetch_failures_total",
            "Total number of failed peer chain fetches",
        ))?;
        registry.register(Box::new(peer_fetch_failures.clone()))?;

        let rejected_candidates = IntCounter::with_opts(Opts::new(
            "rejected_candidates_total",
            "Total number of longer peer chains discarded as invalid",
        ))?;
        registry.register(Box::new(rejected_candidates.clone()))?;

        Ok(Self {
            blocks_mined,
            mining_seconds,
            chain_length,
            chain_replacements,
            peer_fetch_failures,
            rejected_candidates,
        })
    }

    /// Records a successfully mined block.
    pub fn record_mined(&self, elapsed_secs: f64, chain_length: usize) {
        self.blocks_mined.inc();
        self.mining_seconds.observe(elapsed_secs);
        self.chain_length.set(chain_length as i64);
    }

    /// Records the outcome of one consensus run.
    pub fn record_resolution(&self, outcome: &Resolution) {
        if outcome.replaced {
            self.chain_replacements.inc();
        }
        self.peer_fetch_failures
            .inc_by(outcome.unreachable.len() as u64);
        self.rejected_candidates.inc_by(outcome.rejected.len() as u64);
        self.chain_length.set(outcome.length as i64);
    }
}

/// Wrapper around a Prometheus registry and the ledger metrics.
///
/// This is the main handle passed around in the node. It can be wrapped
/// in an [`Arc`] and shared across threads/tasks.
#[derive(Clone)]
pub struct MetricsRegistry {
    registry: Registry,
    pub ledger: LedgerMetrics,
}

impl MetricsRegistry {
    /// Creates a fresh registry (metric prefix `ledger_`) and registers
    /// the ledger metrics.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new_custom(Some("ledger".to_string()), None)?;
        let ledger = LedgerMetrics::register(&registry)?;
        Ok(Self { registry, ledger })
    }

    /// Encodes all metrics in this registry into the Prometheus text format.
    pub fn gather_text(&self) -> String {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        if let Err(e) = TextEncoder::new().encode(&metric_families, &mut buffer) {
            warn!(error = %e, "failed to encode Prometheus metrics");
            return String::new();
        }
        String::from_utf8(buffer).unwrap_or_default()
    }
}

/// Runs an HTTP server that exposes Prometheus metrics.
///
/// The server listens on `addr` and serves `GET /metrics` with the
/// Prometheus text exposition format. All other paths return 404.
pub async fn run_prometheus_http_server(
    metrics: Arc<MetricsRegistry>,
    addr: SocketAddr,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let listener = TcpListener::bind(addr).await?;

    loop {
        let (stream, _) = listener.accept().await?;
        let io = TokioIo::new(stream);
        let metrics = metrics.clone();

        tokio::spawn(async move {
            let svc = service_fn(move |req| {
                let metrics = metrics.clone();
                handle_request(req, metrics)
            });

            if let Err(err) = http1::Builder::new().serve_connection(io, svc).await {
                warn!(error = %err, "metrics connection error");
            }
        });
    }
}

async fn handle_request(
    req: Request<Incoming>,
    metrics: Arc<MetricsRegistry>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    Ok(route(req.method(), req.uri().path(), &metrics))
}

fn route(method: &Method, path: &str, metrics: &MetricsRegistry) -> Response<Full<Bytes>> {
    match (method, path) {
        (&Method::GET, "/metrics") => {
            let mut resp = Response::new(Full::new(Bytes::from(metrics.gather_text())));
            resp.headers_mut().insert(
                CONTENT_TYPE,
                HeaderValue::from_static("text/plain; version=0.0.4"),
            );
            resp
        }
        _ => {
            let mut resp = Response::new(Full::new(Bytes::from_static(b"not found")));
            *resp.status_mut() = StatusCode::NOT_FOUND;
            resp
        }
    }
}
