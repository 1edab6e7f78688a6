//! Consensus engine and related abstractions.
//!
//! This module provides the proof-of-work and chain-selection layer:
//!
//! - configuration parameters ([`config::ConsensusConfig`]),
//! - the proof-of-work puzzle and its stop signal ([`pow`]),
//! - whole-chain validity predicates ([`validator`]),
//! - longest-valid-chain selection ([`fork_choice`]),
//! - peer conflict resolution ([`resolver`]).

pub mod config;
pub mod error;
pub mod fork_choice;
pub mod pow;
pub mod resolver;
pub mod validator;

pub use config::ConsensusConfig;
pub use error::{FetchError, LedgerError, ValidationError};
pub use fork_choice::{LongestValidChain, Verdict, longest_valid_chain};
pub use pow::{ProofOfWork, StopSignal};
pub use resolver::{ChainFetcher, ConsensusResolver, Resolution};
pub use validator::{ChainValidator, ProofOfWorkValidator};
