use std::fmt;

/// Reason a candidate chain failed validation.
///
/// `index` is the `index` field of the offending block, i.e. the later
/// block of the adjacent pair that was checked.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// `previous_hash` does not match the hash of the preceding block.
    BrokenLink { index: u64 },
    /// `proof` does not solve the puzzle for the preceding block's proof.
    InvalidProof { index: u64 },
}

/// Errors returned by mutating ledger operations.
///
/// None of these leave the chain or the pending pool partially updated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LedgerError {
    /// The chain tip kept moving while a proof was being solved.
    StaleMiningTip { attempts: usize },
    /// Mining was abandoned because the stop signal was raised.
    MiningCancelled,
}

/// Errors raised while fetching a peer's chain.
#[derive(Debug)]
pub enum FetchError {
    /// Connection failure, timeout, or other transport-level error.
    Transport(String),
    /// The peer answered with a non-success HTTP status.
    Status(u16),
    /// The peer's response body was not a valid chain summary.
    Protocol(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::BrokenLink { index } => {
                write!(f, "invalid chain: block {index} does not link to its predecessor")
            }
            ValidationError::InvalidProof { index } => {
                write!(f, "invalid chain: block {index} carries an invalid proof of work")
            }
        }
    }
}

impl fmt::Display for LedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerError::StaleMiningTip { attempts } => {
                write!(f, "chain tip moved during mining ({attempts} attempts)")
            }
            LedgerError::MiningCancelled => write!(f, "mining cancelled"),
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Transport(msg) => write!(f, "peer unreachable: {msg}"),
            FetchError::Status(code) => write!(f, "peer returned HTTP status {code}"),
            FetchError::Protocol(msg) => write!(f, "malformed peer response: {msg}"),
        }
    }
}

impl std::error::Error for ValidationError {}
impl std::error::Error for LedgerError {}
impl std::error::Error for FetchError {}
