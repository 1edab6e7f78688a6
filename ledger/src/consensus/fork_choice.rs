//! Longest-valid-chain selection.
//!
//! Candidates are compared by raw block count only. A candidate wins if
//! it is strictly longer than the best seen so far (initially the local
//! chain) and passes the [`ChainValidator`]. Ties keep the incumbent, so
//! when candidates are offered in ascending peer order the
//! lexicographically smallest peer wins among equally long chains.

use crate::types::{Block, ChainSummary};

use super::error::ValidationError;
use super::validator::ChainValidator;

/// Outcome of offering one candidate to [`LongestValidChain::consider`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// The candidate is the new best chain.
    Adopted,
    /// Not strictly longer than the current best; ignored.
    NotLonger,
    /// Reported length disagrees with the number of blocks carried.
    Inconsistent,
    /// Longer, but failed validation.
    Invalid(ValidationError),
}

/// Running selection over a sequence of candidate chains.
#[derive(Debug)]
pub struct LongestValidChain {
    best_length: u64,
    best: Option<(String, Vec<Block>)>,
}

impl LongestValidChain {
    /// Starts a selection where the local chain has `local_length` blocks.
    pub fn new(local_length: u64) -> Self {
        Self {
            best_length: local_length,
            best: None,
        }
    }

    /// Length every later candidate has to beat.
    pub fn best_length(&self) -> u64 {
        self.best_length
    }

    /// Offers `candidate`, reported by `peer`, for selection.
    pub fn consider<V>(&mut self, peer: &str, candidate: ChainSummary, validator: &V) -> Verdict
    where
        V: ChainValidator + ?Sized,
    {
        if candidate.length <= self.best_length {
            return Verdict::NotLonger;
        }
        if !candidate.is_consistent() {
            return Verdict::Inconsistent;
        }
        if let Err(e) = validator.validate_chain(&candidate.chain) {
            return Verdict::Invalid(e);
        }

        self.best_length = candidate.length;
        self.best = Some((peer.to_string(), candidate.chain));
        Verdict::Adopted
    }

    /// Returns the winning peer and its chain, if any candidate won.
    pub fn into_best(self) -> Option<(String, Vec<Block>)> {
        self.best
    }
}

/// Selects the longest valid chain among `candidates`.
///
/// Candidates are visited in ascending peer order regardless of the order
/// they are supplied in; a peer listed twice is considered once, with its
/// first summary. `on_verdict` sees every candidate's peer, reported length
/// and verdict. Returns `None` if no candidate beats `local_length`.
pub fn longest_valid_chain<V, I, F>(
    local_length: u64,
    candidates: I,
    validator: &V,
    mut on_verdict: F,
) -> Option<(String, Vec<Block>)>
where
    V: ChainValidator + ?Sized,
    I: IntoIterator<Item = (String, ChainSummary)>,
    F: FnMut(&str, u64, &Verdict),
{
    let mut candidates: Vec<(String, ChainSummary)> = candidates.into_iter().collect();
    candidates.sort_by(|a, b| a.0.cmp(&b.0));
    candidates.dedup_by(|later, earlier| later.0 == earlier.0);

    let mut selection = LongestValidChain::new(local_length);
    for (peer, summary) in candidates {
        let reported = summary.length;
        let verdict = selection.consider(&peer, summary, validator);
        on_verdict(&peer, reported, &verdict);
    }
    selection.into_best()
}
