//! Proof-of-work puzzle.
//!
//! The puzzle for a new block is: find `proof` such that
//! `SHA256("{previous_proof}{proof}")`, written as lowercase hex, starts
//! with `difficulty` `'0'` characters. Both integers are rendered in
//! plain decimal with no separator. Any node that renders them
//! differently will disagree on every proof, so [`guess_hash`] is the
//! only place this string is built.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::types::sha256_hex;

use super::config::ConsensusConfig;

/// Cooperative cancellation flag for proof search.
///
/// Clones share the same flag, so one handle can be kept by a shutdown
/// hook while another is passed to the miner.
#[derive(Clone, Debug, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Asks every search polling this signal to stop.
    pub fn stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Proof-of-work solver and verifier for a fixed difficulty.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProofOfWork {
    difficulty: usize,
}

impl ProofOfWork {
    pub fn new(difficulty: usize) -> Self {
        Self { difficulty }
    }

    pub fn from_config(cfg: &ConsensusConfig) -> Self {
        Self::new(cfg.difficulty)
    }

    pub fn difficulty(&self) -> usize {
        self.difficulty
    }

    /// Returns `true` if `candidate` solves the puzzle for `previous_proof`.
    pub fn is_valid(&self, previous_proof: u64, candidate: u64) -> bool {
        meets_difficulty(&guess_hash(previous_proof, candidate), self.difficulty)
    }

    /// Brute-forces the smallest proof for `previous_proof`.
    ///
    /// This never gives up; use [`ProofOfWork::solve_until`] when the
    /// search has to be abandonable.
    pub fn solve(&self, previous_proof: u64) -> u64 {
        let mut candidate = 0u64;
        while !self.is_valid(previous_proof, candidate) {
            candidate = candidate.wrapping_add(1);
        }
        candidate
    }

    /// Like [`ProofOfWork::solve`], but checks `stop` before every
    /// candidate and returns `None` once it is raised.
    pub fn solve_until(&self, previous_proof: u64, stop: &StopSignal) -> Option<u64> {
        let mut candidate = 0u64;
        loop {
            if stop.is_stopped() {
                return None;
            }
            if self.is_valid(previous_proof, candidate) {
                return Some(candidate);
            }
            candidate = candidate.wrapping_add(1);
        }
    }
}

/// Hex SHA-256 of the decimal concatenation of both proofs.
pub fn guess_hash(previous_proof: u64, candidate: u64) -> String {
    sha256_hex(format!("{previous_proof}{candidate}").as_bytes())
}

fn meets_difficulty(hex_digest: &str, difficulty: usize) -> bool {
    hex_digest.len() >= difficulty && hex_digest.bytes().take(difficulty).all(|b| b == b'0')
}
