//! Peer conflict resolution.
//!
//! [`ConsensusResolver`] asks every known peer for its chain, keeps the
//! longest one that validates (see [`longest_valid_chain`]), and swaps it
//! in for the local chain. No ledger lock is held while peers are being
//! contacted; the ledger is locked only for the final swap.

use std::collections::BTreeSet;
use std::future::Future;

use tracing::{debug, info, warn};

use crate::engine::Ledger;
use crate::types::ChainSummary;

use super::error::FetchError;
use super::fork_choice::{Verdict, longest_valid_chain};
use super::validator::ChainValidator;

/// Source of peer chains.
///
/// Implementations talk to a remote node and return the chain it reports.
/// They are expected to bound every request with a timeout so a silent
/// peer cannot stall resolution.
pub trait ChainFetcher: Send + Sync {
    fn fetch_chain(
        &self,
        peer: &str,
    ) -> impl Future<Output = Result<ChainSummary, FetchError>> + Send;
}

/// Result of one consensus run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Whether the local chain was replaced.
    pub replaced: bool,
    /// Peer whose chain was adopted, if any.
    pub source: Option<String>,
    /// Local chain length after the run.
    pub length: u64,
    /// Peers whose chain could not be fetched.
    pub unreachable: Vec<String>,
    /// Peers that offered a longer chain which failed validation.
    pub rejected: Vec<String>,
}

/// Longest-valid-chain resolver over a validator and a chain fetcher.
pub struct ConsensusResolver<V, F> {
    validator: V,
    fetcher: F,
}

impl<V, F> ConsensusResolver<V, F>
where
    V: ChainValidator + Sync,
    F: ChainFetcher,
{
    pub fn new(validator: V, fetcher: F) -> Self {
        Self { validator, fetcher }
    }

    pub fn validator(&self) -> &V {
        &self.validator
    }

    /// Runs one round of conflict resolution against `peers`.
    ///
    /// Every distinct peer is contacted once; a peer that cannot be reached
    /// is skipped. The fetched chains go through [`longest_valid_chain`],
    /// which fixes the tie-break. If a strictly longer valid chain is found
    /// it replaces the local chain, unless the local chain has meanwhile
    /// grown at least as long.
    pub async fn resolve(&self, ledger: &Ledger, peers: &[String]) -> Resolution {
        let distinct: BTreeSet<&str> = peers.iter().map(String::as_str).collect();

        let mut candidates = Vec::with_capacity(distinct.len());
        let mut unreachable = Vec::new();
        for peer in distinct {
            match self.fetcher.fetch_chain(peer).await {
                Ok(summary) => candidates.push((peer.to_string(), summary)),
                Err(e) => {
                    warn!(peer = %peer, error = %e, "skipping unreachable peer");
                    unreachable.push(peer.to_string());
                }
            }
        }

        let mut rejected = Vec::new();
        let best = longest_valid_chain(
            ledger.len() as u64,
            candidates,
            &self.validator,
            |peer, reported, verdict| match verdict {
                Verdict::Adopted => {
                    debug!(peer = %peer, length = reported, "new best candidate chain");
                }
                Verdict::NotLonger => {}
                Verdict::Inconsistent => {
                    warn!(peer = %peer, length = reported, "peer misreported its chain length");
                    rejected.push(peer.to_string());
                }
                Verdict::Invalid(e) => {
                    warn!(peer = %peer, length = reported, error = %e, "discarding invalid chain");
                    rejected.push(peer.to_string());
                }
            },
        );

        let (replaced, source) = match best {
            Some((peer, chain)) => {
                let length = chain.len();
                if ledger.adopt_if_longer(chain) {
                    info!(peer = %peer, length, "replaced local chain");
                    (true, Some(peer))
                } else {
                    debug!(peer = %peer, "local chain grew past candidate; keeping it");
                    (false, None)
                }
            }
            None => (false, None),
        };

        Resolution {
            replaced,
            source,
            length: ledger.len() as u64,
            unreachable,
            rejected,
        }
    }
}
