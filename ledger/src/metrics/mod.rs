//! Metrics and instrumentation for the ledger.
//!
//! This module defines Prometheus-compatible metrics for mining and
//! consensus and exposes a small HTTP exporter that serves `/metrics` in
//! Prometheus text format.
//!
//! Typical usage in a node:
//!
//! ```ignore
//! use std::sync::Arc;
//! use ledger::metrics::{MetricsRegistry, run_prometheus_http_server};
//!
//! let registry = Arc::new(MetricsRegistry::new()?);
//! tokio::spawn(run_prometheus_http_server(registry.clone(), cfg.metrics.listen_addr));
//!
//! // After mining:
//! registry.ledger.record_mined(elapsed_secs, ledger.len());
//! ```

pub mod prometheus;

pub use prometheus::{LedgerMetrics, MetricsRegistry, run_prometheus_http_server};
