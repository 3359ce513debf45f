//! Module parameters.
//!
//! Parameters are fixed at startup; [`Params::validate`] runs during
//! engine construction so a misconfigured node refuses to start instead
//! of failing mid-block.

use crate::error::{ParamsError, ParamsResult};
use crate::Amount;
use serde::{Deserialize, Serialize};

/// Engine parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Params {
    /// Minimum stake to register a staking node, base units.
    pub min_stake_amount: Amount,
    /// Per-block mining reward before halving, base units.
    pub initial_block_reward: Amount,
    /// Blocks between reward halvings.
    pub halving_interval: i64,
    /// Lower bound on mining difficulty.
    pub min_difficulty: u64,
    /// Upper bound on mining difficulty.
    pub max_difficulty: u64,
    /// Flat staking payout per online node per chain per block, base units.
    pub staking_reward_per_chain: Amount,
    /// Foreign chains the engine accepts state from.
    pub supported_chains: Vec<String>,
    /// Chain that receives end-of-block sync payloads, if any.
    pub sync_peer_chain: Option<String>,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            min_stake_amount: crate::MIN_NODE_STAKE,
            initial_block_reward: crate::INITIAL_BLOCK_REWARD,
            halving_interval: crate::HALVING_INTERVAL,
            min_difficulty: 1_000,
            max_difficulty: u64::MAX / 4,
            staking_reward_per_chain: crate::STAKING_REWARD_PER_CHAIN,
            supported_chains: vec!["altcoinchain-2330".into(), "polygon-137".into()],
            sync_peer_chain: None,
        }
    }
}

impl Params {
    /// Validate parameter consistency. Called once at startup.
    pub fn validate(&self) -> ParamsResult<()> {
        if self.min_difficulty == 0 {
            return Err(ParamsError::InvalidDifficultyBounds {
                min: self.min_difficulty,
                max: self.max_difficulty,
            });
        }
        if self.min_difficulty > self.max_difficulty {
            return Err(ParamsError::InvalidDifficultyBounds {
                min: self.min_difficulty,
                max: self.max_difficulty,
            });
        }
        if self.halving_interval <= 0 {
            return Err(ParamsError::NonPositiveHalvingInterval(self.halving_interval));
        }
        if self.min_stake_amount == 0 {
            return Err(ParamsError::ZeroMinStake);
        }
        if self.supported_chains.is_empty() {
            return Err(ParamsError::NoSupportedChains);
        }
        Ok(())
    }

    /// Whether a chain id is one the engine accepts state from.
    pub fn supports_chain(&self, chain_id: &str) -> bool {
        self.supported_chains.iter().any(|c| c == chain_id)
    }
}
