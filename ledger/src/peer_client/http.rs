//! HTTP-based chain fetcher.
//!
//! Peers are other ledger nodes exposing the chain summary endpoint:
//!
//! ```json
//! GET http://{peer}/chain
//!
//! Response:
//! {
//!   "chain": [ { "index": 1, "timestamp": 1700000000.0, "transactions": [],
//!                "proof": 100, "previous_hash": "1" }, ... ],
//!   "length": 1
//! }
//! ```
//!
//! The `length` key may also be spelled `total`. Only the summary key is
//! aliased; blocks are decoded with this node's field names.

use std::time::Duration;

use reqwest::Client;

use crate::config::PeerClientConfig;
use crate::consensus::{ChainFetcher, FetchError};
use crate::types::ChainSummary;

/// Path of the chain summary endpoint on every node.
pub const CHAIN_PATH: &str = "/chain";

/// HTTP chain fetcher.
///
/// Cheap to share: `reqwest::Client` pools connections internally. Every
/// request is bounded by the configured timeout.
#[derive(Clone, Debug)]
pub struct HttpChainFetcher {
    client: Client,
    timeout: Duration,
}

impl HttpChainFetcher {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, timeout })
    }

    pub fn from_config(cfg: &PeerClientConfig) -> Result<Self, FetchError> {
        Self::new(cfg.timeout)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

fn chain_url(peer: &str) -> String {
    format!("http://{}{}", peer.trim_end_matches('/'), CHAIN_PATH)
}

impl ChainFetcher for HttpChainFetcher {
    async fn fetch_chain(&self, peer: &str) -> Result<ChainSummary, FetchError> {
        let url = chain_url(peer);

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::Transport(format!("GET {url} failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        resp.json::<ChainSummary>()
            .await
            .map_err(|e| FetchError::Protocol(format!("failed to decode chain from {url}: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serves exactly one HTTP response with the given status line and body.
    async fn serve_once(status: &'static str, body: String) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = stream.read(&mut buf).await;
            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = stream.write_all(response.as_bytes()).await;
            let _ = stream.shutdown().await;
        });

        addr.to_string()
    }

    fn fetcher() -> HttpChainFetcher {
        HttpChainFetcher::new(Duration::from_secs(2)).expect("client should build")
    }

    #[test]
    fn chain_url_targets_chain_endpoint() {
        assert_eq!(chain_url("10.0.0.1:5000"), "http://10.0.0.1:5000/chain");
        assert_eq!(chain_url("node-b/"), "http://node-b/chain");
    }

    #[tokio::test]
    async fn fetches_and_decodes_a_peer_chain() {
        let body = r#"{"chain":[{"index":1,"timestamp":0.0,"transactions":[],"proof":100,"previous_hash":"1"}],"length":1}"#;
        let peer = serve_once("200 OK", body.to_string()).await;

        let summary = fetcher().fetch_chain(&peer).await.expect("fetch should succeed");
        assert_eq!(summary.length, 1);
        assert_eq!(summary.chain[0].proof, 100);
        assert!(summary.chain[0].is_genesis());
    }

    #[tokio::test]
    async fn non_success_status_is_reported() {
        let peer = serve_once("503 Service Unavailable", "{}".to_string()).await;
        match fetcher().fetch_chain(&peer).await {
            Err(FetchError::Status(503)) => {}
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn undecodable_body_is_a_protocol_error() {
        let peer = serve_once("200 OK", r#"{"blocks":[]}"#.to_string()).await;
        match fetcher().fetch_chain(&peer).await {
            Err(FetchError::Protocol(_)) => {}
            other => panic!("expected protocol error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn closed_port_is_a_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let peer = listener.local_addr().unwrap().to_string();
        drop(listener);

        match fetcher().fetch_chain(&peer).await {
            Err(FetchError::Transport(_)) => {}
            other => panic!("expected transport error, got {other:?}"),
        }
    }
}
