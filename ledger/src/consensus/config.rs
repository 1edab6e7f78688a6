/// Consensus configuration parameters.
///
/// This includes both protocol-level knobs (difficulty, genesis proof,
/// reward) and implementation-level limits (mining retries, sync period).
#[derive(Clone, Debug)]
pub struct ConsensusConfig {
    /// Number of leading `'0'` hex digits a proof-of-work hash must have.
    pub difficulty: usize,
    /// Proof stored in the genesis block.
    pub genesis_proof: u64,
    /// Amount credited to the miner of each block.
    pub mining_reward: u64,
    /// How many times mining re-solves after the chain tip moved underneath
    /// it before giving up with a stale-tip error.
    pub max_mining_attempts: usize,
    /// Period of the background consensus run, in seconds. Zero disables it.
    pub sync_interval_secs: u64,
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self {
            difficulty: 4,
            genesis_proof: 100,
            mining_reward: 1,
            max_mining_attempts: 3,
            sync_interval_secs: 30,
        }
    }
}
