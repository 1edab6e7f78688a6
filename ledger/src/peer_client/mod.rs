//! Clients for fetching chains from peer nodes.
//!
//! This module provides concrete implementations of the generic
//! [`crate::consensus::ChainFetcher`] trait. They are responsible for
//! talking to other ledger nodes and translating their responses into
//! [`crate::types::ChainSummary`] values.

pub mod http;

pub use http::HttpChainFetcher;
