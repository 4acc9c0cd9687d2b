// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// BLOCK-HASH LOTTERY - CHAIN ORACLE
//
// Source of "current height" and "hash of block N". The engine is generic over
// `ChainOracle` so a stronger entropy source can replace block hashes without
// touching settlement logic.
//
// `SimulatedChain`: in-memory chain with deterministic SHA3-256 block hashes
// and an EVM-style lookback window.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use crate::config::LotteryConfig;
use crate::{BlockHash, BLOCK_HASH_LEN, HASH_LOOKBACK};
use sha3::{Digest, Sha3_256};

/// Read-only view of the chain the lottery settles against.
pub trait ChainOracle {
    /// Height of the block currently being built
    fn current_height(&self) -> u64;

    /// Hash of block `height`, or `None` if it is not mined yet or has left
    /// the retrievable window.
    fn hash_of(&self, height: u64) -> Option<BlockHash>;
}

impl<T: ChainOracle + ?Sized> ChainOracle for &T {
    fn current_height(&self) -> u64 {
        (**self).current_height()
    }

    fn hash_of(&self, height: u64) -> Option<BlockHash> {
        (**self).hash_of(height)
    }
}

#[derive(Debug, Clone)]
pub struct SimulatedChain {
    height: u64,
    lookback: u64,
    seed: [u8; BLOCK_HASH_LEN],
}

impl Default for SimulatedChain {
    fn default() -> Self {
        Self::new(HASH_LOOKBACK)
    }
}

impl SimulatedChain {
    pub fn new(lookback: u64) -> Self {
        Self::with_seed(lookback, b"lottery-simulated-chain")
    }

    /// Chain whose hash window matches the deployment's `hash_lookback`.
    pub fn from_config(config: &LotteryConfig) -> Self {
        Self::new(config.hash_lookback)
    }

    /// Different seeds give different (but still deterministic) hash sequences.
    pub fn with_seed(lookback: u64, seed: &[u8]) -> Self {
        let mut hasher = Sha3_256::new();
        hasher.update(seed);
        let mut digest = [0u8; BLOCK_HASH_LEN];
        digest.copy_from_slice(&hasher.finalize());
        Self {
            height: 0,
            lookback,
            seed: digest,
        }
    }

    /// Start the chain at an arbitrary height.
    pub fn at_height(mut self, height: u64) -> Self {
        self.height = height;
        self
    }

    /// Mine `blocks` blocks. Returns the new height.
    pub fn mine(&mut self, blocks: u64) -> u64 {
        self.height = self.height.saturating_add(blocks);
        self.height
    }

    pub fn lookback(&self) -> u64 {
        self.lookback
    }

    /// Hash of `height` regardless of the window.
    pub fn block_hash(&self, height: u64) -> BlockHash {
        let mut hasher = Sha3_256::new();
        hasher.update(self.seed);
        hasher.update(height.to_le_bytes());
        let mut out = [0u8; BLOCK_HASH_LEN];
        out.copy_from_slice(&hasher.finalize());
        BlockHash(out)
    }
}

impl ChainOracle for SimulatedChain {
    fn current_height(&self) -> u64 {
        self.height
    }

    fn hash_of(&self, height: u64) -> Option<BlockHash> {
        // Only the `lookback` most recent completed blocks are visible
        if height >= self.height || self.height - height > self.lookback {
            return None;
        }
        Some(self.block_hash(height))
    }
}
