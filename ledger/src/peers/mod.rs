//! Registry of known peer nodes.
//!
//! Peers are stored by network location (`host[:port]`), deduplicated, and
//! iterated in ascending order so consensus visits them deterministically.
//! There is no liveness tracking and no removal.

use std::collections::BTreeSet;

use parking_lot::RwLock;
use reqwest::Url;
use tracing::debug;

/// Extracts the network location (`host:port`) from a peer address.
///
/// Scheme, credentials, path and query are discarded. An address without
/// a scheme (`"10.0.0.5:5000"`) is read as an `http://` URL. The port is
/// always spelled out, falling back to the scheme's default, so
/// `"https://node"`, `"https://node:443"` and `"node:443"` are one peer.
/// Input that does not parse yields an empty string.
pub fn network_location(address: &str) -> String {
    let address = address.trim();
    let parsed = if address.contains("://") {
        Url::parse(address)
    } else {
        Url::parse(&format!("http://{address}"))
    };

    let Ok(url) = parsed else {
        return String::new();
    };
    match (url.host_str(), url.port_or_known_default()) {
        (Some(host), Some(port)) => format!("{host}:{port}"),
        (Some(host), None) => host.to_string(),
        (None, _) => String::new(),
    }
}

/// Thread-safe set of peer network locations.
#[derive(Debug, Default)]
pub struct PeerRegistry {
    peers: RwLock<BTreeSet<String>>,
}

impl PeerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the network location of `address` and returns it.
    ///
    /// Registering a location that is already known is a no-op. Addresses
    /// that yield an empty location are recorded as-is; rejecting them is
    /// up to the caller.
    pub fn register(&self, address: &str) -> String {
        let location = network_location(address);
        if self.peers.write().insert(location.clone()) {
            debug!(peer = %location, "registered peer");
        }
        location
    }

    /// Registers every address in `addresses`, returning their locations.
    pub fn register_all<I, S>(&self, addresses: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        addresses
            .into_iter()
            .map(|a| self.register(a.as_ref()))
            .collect()
    }

    /// Known peers in ascending order.
    pub fn peers(&self) -> Vec<String> {
        self.peers.read().iter().cloned().collect()
    }

    pub fn contains(&self, location: &str) -> bool {
        self.peers.read().contains(location)
    }

    pub fn len(&self) -> usize {
        self.peers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.read().is_empty()
    }
}
