//! Persisted entities.
//!
//! All entities live in one key-value store under type-specific key
//! prefixes (see [`crate::keys`]) and are serialized as JSON. The engine
//! is the sole writer; every mutation flows through a typed operation.

use crate::Amount;
use serde::{Deserialize, Serialize};

/// A mining rig NFT mirrored from a foreign chain.
///
/// Created and updated only through authenticated `mining_rig_update`
/// messages, uniquely keyed by `(token_id, chain_id)`. Rigs are never
/// deleted; deactivation flips `is_active` so history stays auditable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MiningRig {
    /// NFT token id on the source chain.
    pub token_id: u64,
    /// Local account that receives this rig's mining rewards.
    pub owner: String,
    /// Source chain identifier.
    pub chain_id: String,
    /// NFT contract address on the source chain.
    pub contract_address: String,
    /// Declared hash power, the proportional-split weight.
    pub hash_power: u64,
    /// Declared power draw in watts.
    pub watt_consumption: u64,
    /// Whether the rig participates in reward distribution.
    pub is_active: bool,
    /// Unix timestamp of the last update, from block time.
    pub last_updated: i64,
}

impl MiningRig {
    /// Composite store key under the mining-rig prefix.
    pub fn store_key(&self) -> Vec<u8> {
        crate::keys::mining_rig_key(self.token_id, &self.chain_id)
    }
}

/// A pool operator whose foreign-chain stake has been attested.
///
/// The engine never originates these records; it only mirrors what an
/// authenticated `pool_operator_stake` message asserts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolOperator {
    /// Operator address on the source chain.
    pub address: String,
    /// Source chain identifier.
    pub chain_id: String,
    /// Whether the required utility-token stake is locked on the source chain.
    pub has_staked_watt: bool,
    /// Aggregated hash power of the operator's pool.
    pub total_hash_power: u64,
}

impl PoolOperator {
    /// Composite store key under the pool-operator prefix.
    pub fn store_key(&self) -> Vec<u8> {
        crate::keys::pool_operator_key(&self.address, &self.chain_id)
    }
}

/// A validator/staking node registered with the minimum stake.
///
/// Nodes persist forever; a node that stops signing goes stale with
/// `is_online = false` rather than being purged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakingNode {
    /// Operator account, the registry key.
    pub operator: String,
    /// Human-readable node name.
    pub moniker: String,
    /// Locked stake in base units, at least the module minimum.
    pub staked_amount: Amount,
    /// Whether the node signed recently enough to earn staking payouts.
    pub is_online: bool,
    /// Height of the last block this node signed.
    pub last_block_signed: i64,
    /// One unit of voting power per whole staked token.
    pub voting_power: u64,
    /// Foreign chains this node relays rewards for.
    pub supported_chains: Vec<String>,
}

impl StakingNode {
    /// Store key under the staking-node prefix.
    pub fn store_key(&self) -> Vec<u8> {
        crate::keys::staking_node_key(&self.operator)
    }
}

/// A bundle of locally-verified work handed to the L1 collaborator.
///
/// Immutable once constructed; idempotent re-submission is the
/// collaborator's responsibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardBatch {
    /// Height of the block containing the verified attempt.
    pub height: i64,
    /// Hash of that block.
    pub block_hash: Vec<u8>,
    /// Block timestamp in milliseconds.
    pub timestamp: i64,
    /// The verified proof, carried through for anchoring.
    pub proof: Vec<u8>,
    /// Transaction count of the block.
    pub tx_count: u32,
}

/// Per-chain analytics accumulated from informational cross-chain messages.
///
/// Updated by `reward_distribution` and `block_sync` notifications; this is
/// bookkeeping only and never drives a mint or transfer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainAnalytics {
    /// Source chain identifier.
    pub chain_id: String,
    /// Informational messages seen from this chain.
    pub messages_seen: u64,
    /// Greatest foreign block height reported.
    pub last_reported_height: i64,
    /// Sum of rewards reported by the foreign chain, base units.
    pub reported_reward_total: Amount,
}

impl ChainAnalytics {
    /// Store key under the analytics prefix.
    pub fn store_key(&self) -> Vec<u8> {
        crate::keys::chain_analytics_key(&self.chain_id)
    }
}
