//! # quarry-types
//!
//! Shared types for the quarry settlement engine.
//!
//! This crate provides:
//! - Persisted entities (mining rigs, pool operators, staking nodes)
//! - The block context handed to lifecycle hooks
//! - Store key prefixes and composite-key encoding
//! - Module parameters with startup validation
//! - Typed block-level events
//! - Genesis state

mod block;
mod entities;
mod error;
mod events;
mod genesis;
pub mod keys;
mod params;

pub use block::BlockContext;
pub use entities::{
    ChainAnalytics, MiningRig, PoolOperator, RewardBatch, StakingNode,
};
pub use error::{ParamsError, ParamsResult};
pub use events::EngineEvent;
pub use genesis::GenesisState;
pub use params::Params;

/// Token amount in base units (10^18 base units per whole token).
///
/// Amounts routinely exceed `u64::MAX` (the minimum node stake alone is
/// 21 * 10^18), so all balances and rewards are carried as `u128`.
pub type Amount = u128;

/// Base units per whole token.
pub const BASE_UNITS_PER_TOKEN: Amount = 1_000_000_000_000_000_000;

/// Minimum stake required to register a staking node (21 tokens).
pub const MIN_NODE_STAKE: Amount = 21 * BASE_UNITS_PER_TOKEN;

/// Initial per-block mining reward (0.05 tokens).
pub const INITIAL_BLOCK_REWARD: Amount = 50_000_000_000_000_000;

/// Blocks between reward halvings.
pub const HALVING_INTERVAL: i64 = 210_000_000;

/// Flat staking payout per online node per supported chain per block
/// (0.001 of the companion utility token).
pub const STAKING_REWARD_PER_CHAIN: Amount = 1_000_000_000_000_000;

/// Native denomination minted for mining rewards.
pub const NATIVE_DENOM: &str = "qry";

/// Companion utility denomination released on foreign chains.
pub const UTILITY_DENOM: &str = "watt";

/// Module account that rewards are minted into before transfer.
pub const MODULE_ACCOUNT: &str = "quarry_mining";
