//! The ledger engine.
//!
//! [`Ledger`] owns the chain and the pending transaction pool. Both live
//! behind a single lock so that a sealed block always carries exactly the
//! transactions that were pending at commit time.
//!
//! Mining is optimistic: the tip is snapshotted, the proof is solved with
//! the lock released, and the commit re-checks the tip before appending.
//! Transaction submission therefore never waits for the proof search.
//!
//! The chain is held as an `Arc<Vec<Block>>`. Readers get a cheap snapshot;
//! appends go through `Arc::make_mut`, so a snapshot handed out earlier is
//! never modified underneath its holder, and consensus replaces the whole
//! `Arc` in one assignment.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::consensus::{ConsensusConfig, LedgerError, ProofOfWork, StopSignal};
use crate::types::{Amount, Block, BlockHash, ChainSummary, NodeId, Transaction};

struct LedgerState {
    chain: Arc<Vec<Block>>,
    pending: Vec<Transaction>,
}

impl LedgerState {
    fn tip(&self) -> &Block {
        self.chain
            .last()
            .expect("chain always contains the genesis block")
    }

    /// Seals the pending pool into a new block on top of the tip.
    fn seal(&mut self, proof: u64, previous_hash: BlockHash, timestamp: f64) -> Block {
        let block = Block {
            index: self.chain.len() as u64 + 1,
            timestamp,
            transactions: std::mem::take(&mut self.pending),
            proof,
            previous_hash,
        };
        Arc::make_mut(&mut self.chain).push(block.clone());
        block
    }
}

/// A node's chain plus its pool of not-yet-sealed transactions.
pub struct Ledger {
    config: ConsensusConfig,
    node_id: NodeId,
    pow: ProofOfWork,
    state: Mutex<LedgerState>,
}

impl Ledger {
    /// Creates a ledger holding only a freshly sealed genesis block.
    pub fn new(config: ConsensusConfig, node_id: NodeId) -> Self {
        let genesis = Block::genesis(config.genesis_proof, current_unix_timestamp());
        let pow = ProofOfWork::from_config(&config);
        Self {
            config,
            node_id,
            pow,
            state: Mutex::new(LedgerState {
                chain: Arc::new(vec![genesis]),
                pending: Vec::new(),
            }),
        }
    }

    pub fn config(&self) -> &ConsensusConfig {
        &self.config
    }

    pub fn node_id(&self) -> &NodeId {
        &self.node_id
    }

    pub fn proof_of_work(&self) -> &ProofOfWork {
        &self.pow
    }

    /// Queues a transfer for the next block.
    ///
    /// Returns the index of the block it will be sealed into.
    pub fn new_transaction(
        &self,
        sender: impl Into<String>,
        recipient: impl Into<String>,
        amount: impl Into<Amount>,
    ) -> u64 {
        self.submit(Transaction::new(sender, recipient, amount))
    }

    /// Queues an already-built transaction. See [`Ledger::new_transaction`].
    pub fn submit(&self, tx: Transaction) -> u64 {
        let mut state = self.state.lock();
        state.pending.push(tx);
        state.tip().index + 1
    }

    /// Solves the next proof and seals the pending pool into a new block.
    ///
    /// The proof search runs without holding the ledger lock. If the tip
    /// changed by the time a proof is found (another block was mined, or
    /// consensus replaced the chain) the search is repeated against the new
    /// tip, up to `max_mining_attempts` times.
    ///
    /// The mining reward is added to the pool only at commit, so a failed
    /// or cancelled attempt leaves the pool exactly as it was.
    pub fn mine_block(&self, stop: &StopSignal) -> Result<Block, LedgerError> {
        self.mine_block_with(stop, |_| {})
    }

    /// [`Ledger::mine_block`] with `on_solved` run after each proof is
    /// found and before the commit is attempted, lock released.
    fn mine_block_with<F>(
        &self,
        stop: &StopSignal,
        mut on_solved: F,
    ) -> Result<Block, LedgerError>
    where
        F: FnMut(usize),
    {
        let attempts = self.config.max_mining_attempts.max(1);

        for attempt in 1..=attempts {
            let snapshot = self.chain();
            let tip = snapshot
                .last()
                .expect("chain always contains the genesis block");
            let tip_hash = tip.compute_hash();

            let proof = self
                .pow
                .solve_until(tip.proof, stop)
                .ok_or(LedgerError::MiningCancelled)?;
            on_solved(attempt);

            match self.try_commit(&tip_hash, proof) {
                Some(block) => {
                    info!(
                        index = block.index,
                        proof = block.proof,
                        transactions = block.transactions.len(),
                        "sealed new block"
                    );
                    return Ok(block);
                }
                None => {
                    debug!(attempt, "chain tip moved while mining; retrying");
                }
            }
        }

        Err(LedgerError::StaleMiningTip { attempts })
    }

    /// Appends a block with `proof` if the tip still hashes to `expected_tip`.
    fn try_commit(&self, expected_tip: &BlockHash, proof: u64) -> Option<Block> {
        let mut state = self.state.lock();
        if state.tip().compute_hash() != *expected_tip {
            return None;
        }

        let reward = Transaction::reward(&self.node_id, self.config.mining_reward);
        state.pending.push(reward);
        Some(state.seal(proof, expected_tip.clone(), current_unix_timestamp()))
    }

    /// Replaces the chain with `candidate` if it is strictly longer than
    /// the current chain at the moment of the swap.
    ///
    /// This is the only way the chain changes other than by appending. The
    /// pending pool is kept.
    pub fn adopt_if_longer(&self, candidate: Vec<Block>) -> bool {
        let mut state = self.state.lock();
        if candidate.len() <= state.chain.len() {
            return false;
        }
        state.chain = Arc::new(candidate);
        true
    }

    /// Returns a snapshot of the chain.
    pub fn chain(&self) -> Arc<Vec<Block>> {
        self.state.lock().chain.clone()
    }

    /// Returns the chain in its wire shape.
    pub fn summary(&self) -> ChainSummary {
        ChainSummary::new(self.chain().as_ref().clone())
    }

    pub fn last_block(&self) -> Block {
        self.state.lock().tip().clone()
    }

    /// Number of blocks in the chain (never zero).
    pub fn len(&self) -> usize {
        self.state.lock().chain.len()
    }

    pub fn pending_transactions(&self) -> Vec<Transaction> {
        self.state.lock().pending.clone()
    }

    pub fn pending_len(&self) -> usize {
        self.state.lock().pending.len()
    }
}

/// Returns the current wall-clock time as fractional seconds since the
/// Unix epoch, or 0 if the system clock is set before the epoch.
fn current_unix_timestamp() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_else(|_| Duration::from_secs(0))
        .as_secs_f64()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consensus::{ChainValidator, ProofOfWorkValidator};
    use crate::types::{BlockHash, REWARD_SENDER};

    fn config() -> ConsensusConfig {
        ConsensusConfig {
            difficulty: 2,
            ..ConsensusConfig::default()
        }
    }

    fn new_ledger() -> Ledger {
        Ledger::new(config(), NodeId::new("miner-1"))
    }

    #[test]
    fn fresh_ledger_holds_only_genesis() {
        let ledger = new_ledger();
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.pending_len(), 0);

        let genesis = ledger.last_block();
        assert_eq!(genesis.index, 1);
        assert_eq!(genesis.proof, 100);
        assert_eq!(genesis.previous_hash, BlockHash::genesis());
        assert!(genesis.is_genesis());
        assert!(genesis.transactions.is_empty());
    }

    #[test]
    fn new_transaction_reports_the_next_block_index() {
        let ledger = new_ledger();
        assert_eq!(ledger.new_transaction("A", "B", 5u64), 2);
        assert_eq!(ledger.new_transaction("B", "C", 2u64), 2);

        ledger.mine_block(&StopSignal::new()).unwrap();
        assert_eq!(ledger.new_transaction("C", "D", "1btc"), 3);
    }

    #[test]
    fn mining_seals_pending_transactions_and_reward() {
        let ledger = new_ledger();
        ledger.new_transaction("A", "B", 5u64);
        ledger.new_transaction("B", "C", 2u64);
        assert_eq!(ledger.pending_len(), 2);

        let genesis_hash = ledger.last_block().compute_hash();
        let block = ledger.mine_block(&StopSignal::new()).unwrap();

        assert_eq!(block.index, 2);
        assert_eq!(block.transactions.len(), 3);
        assert_eq!(block.transactions[0], Transaction::new("A", "B", 5u64));
        assert_eq!(block.transactions[1], Transaction::new("B", "C", 2u64));

        let reward = &block.transactions[2];
        assert_eq!(reward.sender, REWARD_SENDER);
        assert_eq!(reward.recipient, "miner-1");
        assert_eq!(reward.amount, Amount::from(1u64));

        assert_eq!(block.previous_hash, genesis_hash);
        assert!(ledger.proof_of_work().is_valid(100, block.proof));
        assert_eq!(ledger.pending_len(), 0);
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.last_block(), block);
    }

    #[test]
    fn mining_with_empty_pool_still_pays_reward() {
        let ledger = new_ledger();
        let block = ledger.mine_block(&StopSignal::new()).unwrap();
        assert_eq!(block.transactions.len(), 1);
        assert!(block.transactions[0].is_reward());
    }

    #[test]
    fn repeated_mining_produces_a_valid_chain() {
        let ledger = new_ledger();
        let stop = StopSignal::new();
        for i in 0..5u64 {
            ledger.new_transaction("A", "B", i);
            ledger.mine_block(&stop).unwrap();
        }

        let chain = ledger.chain();
        assert_eq!(chain.len(), 6);
        assert!(chain.windows(2).all(|w| w[1].index == w[0].index + 1));
        assert!(ProofOfWorkValidator::from_config(&config()).is_valid(&chain));
    }

    #[test]
    fn cancelled_mining_leaves_state_untouched() {
        let cfg = ConsensusConfig {
            difficulty: 65,
            ..ConsensusConfig::default()
        };
        let ledger = Ledger::new(cfg, NodeId::new("miner-1"));
        ledger.new_transaction("A", "B", 5u64);

        let stop = StopSignal::new();
        stop.stop();
        assert_eq!(ledger.mine_block(&stop), Err(LedgerError::MiningCancelled));
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.pending_transactions(), vec![Transaction::new("A", "B", 5u64)]);
    }

    #[test]
    fn commit_against_a_moved_tip_is_refused() {
        let ledger = new_ledger();
        let stale_tip = ledger.last_block();
        let stale_hash = stale_tip.compute_hash();
        let proof = ledger.proof_of_work().solve(stale_tip.proof);

        ledger.mine_block(&StopSignal::new()).unwrap();
        ledger.new_transaction("A", "B", 5u64);

        assert!(ledger.try_commit(&stale_hash, proof).is_none());
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.pending_len(), 1);
    }

    #[test]
    fn adopt_requires_a_strictly_longer_chain() {
        let local = new_ledger();
        let remote = new_ledger();
        let stop = StopSignal::new();
        remote.mine_block(&stop).unwrap();
        remote.mine_block(&stop).unwrap();

        local.mine_block(&stop).unwrap();
        local.new_transaction("A", "B", 5u64);

        let same_length = remote.chain().as_ref()[..2].to_vec();
        assert!(!local.adopt_if_longer(same_length));
        assert_eq!(local.len(), 2);

        let longer = remote.chain().as_ref().clone();
        assert!(local.adopt_if_longer(longer.clone()));
        assert_eq!(local.chain().as_ref(), &longer);
        assert_eq!(local.pending_len(), 1, "pending pool survives replacement");
    }

    #[test]
    fn snapshots_are_not_affected_by_later_appends_or_swaps() {
        let ledger = new_ledger();
        let before = ledger.chain();

        ledger.mine_block(&StopSignal::new()).unwrap();
        assert_eq!(before.len(), 1);

        let mid = ledger.chain();
        let other = new_ledger();
        let stop = StopSignal::new();
        for _ in 0..3 {
            other.mine_block(&stop).unwrap();
        }
        assert!(ledger.adopt_if_longer(other.chain().as_ref().clone()));
        assert_eq!(mid.len(), 2);
        assert_eq!(ledger.len(), 4);
    }

    #[test]
    fn submissions_during_mining_are_never_lost() {
        let ledger = Arc::new(new_ledger());
        let stop = StopSignal::new();

        let submitters: Vec<_> = (0..4)
            .map(|t| {
                let ledger = ledger.clone();
                std::thread::spawn(move || {
                    for i in 0..25u64 {
                        ledger.new_transaction(format!("s{t}"), "r", i);
                    }
                })
            })
            .collect();

        let miner = {
            let ledger = ledger.clone();
            let stop = stop.clone();
            std::thread::spawn(move || {
                for _ in 0..3 {
                    ledger.mine_block(&stop).unwrap();
                }
            })
        };

        for handle in submitters {
            handle.join().unwrap();
        }
        miner.join().unwrap();

        let sealed: usize = ledger
            .chain()
            .iter()
            .flat_map(|b| b.transactions.iter())
            .filter(|tx| !tx.is_reward())
            .count();
        assert_eq!(sealed + ledger.pending_len(), 100);
        assert_eq!(ledger.len(), 4);
    }

    /// A ledger on a different history, `blocks` long.
    fn other_history(blocks: usize) -> Vec<Block> {
        let other = Ledger::new(config(), NodeId::new("miner-2"));
        let stop = StopSignal::new();
        while other.len() < blocks {
            other.mine_block(&stop).unwrap();
        }
        other.chain().as_ref().clone()
    }

    #[test]
    fn mining_retries_on_top_of_a_tip_that_moved() {
        let ledger = new_ledger();
        ledger.new_transaction("A", "B", 5u64);
        let history = other_history(2);

        let mut solved = Vec::new();
        let block = ledger
            .mine_block_with(&StopSignal::new(), |attempt| {
                solved.push(attempt);
                if attempt == 1 {
                    assert!(ledger.adopt_if_longer(history.clone()));
                }
            })
            .unwrap();

        assert_eq!(solved, vec![1, 2]);
        assert_eq!(block.index, 3);
        assert_eq!(block.previous_hash, history[1].compute_hash());
        assert!(ledger.proof_of_work().is_valid(history[1].proof, block.proof));
        assert_eq!(block.transactions.len(), 2);
        assert_eq!(block.transactions[0], Transaction::new("A", "B", 5u64));
        assert_eq!(ledger.len(), 3);
        assert_eq!(ledger.pending_len(), 0);
        assert!(ProofOfWorkValidator::from_config(&config()).is_valid(&ledger.chain()));
    }

    #[test]
    fn tip_moving_on_every_attempt_gives_up_as_stale() {
        let cfg = ConsensusConfig {
            max_mining_attempts: 2,
            ..config()
        };
        let ledger = Ledger::new(cfg, NodeId::new("miner-1"));
        ledger.new_transaction("A", "B", 5u64);
        let history = other_history(3);

        let result = ledger.mine_block_with(&StopSignal::new(), |_| {
            let longer = history[..ledger.len() + 1].to_vec();
            assert!(ledger.adopt_if_longer(longer));
        });

        assert_eq!(result, Err(LedgerError::StaleMiningTip { attempts: 2 }));
        assert_eq!(ledger.chain().as_ref(), &history);
        assert_eq!(ledger.pending_transactions(), vec![Transaction::new("A", "B", 5u64)]);
    }

    #[test]
    fn single_attempt_budget_fails_on_first_moved_tip() {
        let cfg = ConsensusConfig {
            max_mining_attempts: 1,
            ..config()
        };
        let ledger = Ledger::new(cfg, NodeId::new("miner-1"));
        let history = other_history(2);

        let result = ledger.mine_block_with(&StopSignal::new(), |_| {
            ledger.adopt_if_longer(history.clone());
        });

        assert_eq!(result, Err(LedgerError::StaleMiningTip { attempts: 1 }));
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.pending_len(), 0);
    }
}
