//! Chain validity predicates used by consensus.

use crate::types::Block;

use super::config::ConsensusConfig;
use super::error::ValidationError;
use super::pow::ProofOfWork;

/// Pluggable validity predicate for whole chains.
///
/// Implementations must be deterministic and side-effect free; they never
/// mutate the chain they inspect.
pub trait ChainValidator {
    fn validate_chain(&self, chain: &[Block]) -> Result<(), ValidationError>;

    fn is_valid(&self, chain: &[Block]) -> bool {
        self.validate_chain(chain).is_ok()
    }
}

/// Checks hash linkage and proof-of-work for every adjacent block pair.
///
/// The first block is trusted as genesis. For each later block, its
/// `previous_hash` must equal the recomputed hash of its predecessor and
/// its `proof` must solve the puzzle seeded by the predecessor's proof.
/// Validation stops at the first failing block.
#[derive(Clone, Copy, Debug)]
pub struct ProofOfWorkValidator {
    pow: ProofOfWork,
}

impl ProofOfWorkValidator {
    pub fn new(pow: ProofOfWork) -> Self {
        Self { pow }
    }

    pub fn from_config(cfg: &ConsensusConfig) -> Self {
        Self::new(ProofOfWork::from_config(cfg))
    }
}

impl ChainValidator for ProofOfWorkValidator {
    fn validate_chain(&self, chain: &[Block]) -> Result<(), ValidationError> {
        for pair in chain.windows(2) {
            let (previous, current) = (&pair[0], &pair[1]);

            if current.previous_hash != previous.compute_hash() {
                return Err(ValidationError::BrokenLink {
                    index: current.index,
                });
            }
            if !self.pow.is_valid(previous.proof, current.proof) {
                return Err(ValidationError::InvalidProof {
                    index: current.index,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consensus::pow::StopSignal;
    use crate::engine::Ledger;
    use crate::types::{Block, BlockHash, NodeId};

    const DIFFICULTY: usize = 2;

    fn mined_chain(blocks: usize) -> Vec<Block> {
        let cfg = ConsensusConfig {
            difficulty: DIFFICULTY,
            ..ConsensusConfig::default()
        };
        let ledger = Ledger::new(cfg, NodeId::new("validator-test"));
        let stop = StopSignal::new();
        while ledger.len() < blocks {
            ledger.new_transaction("A", "B", ledger.len() as u64);
            ledger.mine_block(&stop).expect("mining should succeed");
        }
        ledger.chain().as_ref().clone()
    }

    fn validator() -> ProofOfWorkValidator {
        ProofOfWorkValidator::new(ProofOfWork::new(DIFFICULTY))
    }

    fn flip_first_char(hash: &BlockHash) -> BlockHash {
        let mut s = hash.0.clone();
        let replacement = if s.starts_with('0') { "1" } else { "0" };
        s.replace_range(0..1, replacement);
        BlockHash(s)
    }

    #[test]
    fn chains_built_by_mining_are_valid() {
        let chain = mined_chain(6);
        assert_eq!(chain.len(), 6);
        assert_eq!(validator().validate_chain(&chain), Ok(()));
    }

    #[test]
    fn trivially_short_chains_are_valid() {
        assert!(validator().is_valid(&[]));
        assert!(validator().is_valid(&[Block::genesis(100, 0.0)]));
    }

    #[test]
    fn tampered_previous_hash_is_rejected_at_that_block() {
        let chain = mined_chain(5);
        for i in 1..chain.len() {
            let mut tampered = chain.clone();
            tampered[i].previous_hash = flip_first_char(&tampered[i].previous_hash);
            assert_eq!(
                validator().validate_chain(&tampered),
                Err(ValidationError::BrokenLink {
                    index: tampered[i].index
                }),
                "block {i}"
            );
        }
    }

    #[test]
    fn tampered_proof_is_rejected() {
        let chain = mined_chain(5);
        let pow = ProofOfWork::new(DIFFICULTY);
        for i in 1..chain.len() {
            let mut tampered = chain.clone();
            let previous_proof = tampered[i - 1].proof;
            let bad = (0u64..)
                .find(|c| !pow.is_valid(previous_proof, *c))
                .expect("some candidate must be invalid");
            tampered[i].proof = bad;

            let err = validator().validate_chain(&tampered).unwrap_err();
            assert_eq!(err, ValidationError::InvalidProof { index: tampered[i].index });
        }
    }

    #[test]
    fn tampered_transactions_break_the_next_link() {
        let mut chain = mined_chain(4);
        chain[1].transactions[0].recipient = "Mallory".to_string();

        assert_eq!(
            validator().validate_chain(&chain),
            Err(ValidationError::BrokenLink { index: chain[2].index })
        );
    }

    #[test]
    fn genesis_is_trusted_unconditionally() {
        let mut chain = mined_chain(1);
        chain[0].proof = 7;
        chain[0].transactions.clear();
        assert!(validator().is_valid(&chain));
    }
}
