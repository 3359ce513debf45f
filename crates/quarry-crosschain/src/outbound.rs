//! Outbound payload construction and emission.

use crate::{
    CrossChainTransport, CrosschainResult, MSG_BLOCK_SYNC, MSG_REWARD_DISTRIBUTION,
    MSG_WATT_REWARD,
};
use quarry_registry::NodeRegistry;
use quarry_storage::Storage;
use quarry_types::{Amount, UTILITY_DENOM};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

/// Outbound `watt_reward` payload.
///
/// This is a request for the destination chain to release utility
/// tokens; nothing is minted locally. Amounts cross the wire as decimal
/// strings, matching the inbound convention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakingPayout {
    /// Wire tag, always `watt_reward`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Node operator to credit.
    pub recipient: String,
    /// Amount in base units, decimal string.
    pub amount: String,
    /// Denomination of the payout, always the utility token.
    pub denom: String,
    /// Local block height of the payout.
    pub block_height: i64,
}

/// Outbound `reward_distribution` payload.
///
/// Mirrors the inbound [`crate::RewardNotice`] shape so a peer running
/// the same engine can ingest it unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct MinedRewardNotice {
    #[serde(rename = "type")]
    kind: String,
    miner: String,
    reward: String,
    block_height: i64,
    timestamp: i64,
}

/// Outbound `block_sync` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct BlockSyncNotice {
    #[serde(rename = "type")]
    kind: String,
    block_height: i64,
    block_time: i64,
    difficulty: u64,
}

/// Pay the flat per-block staking reward to every online node.
///
/// One payload per `(node, supported chain)` pair. A failed delivery is
/// logged and the remaining chains and nodes still get theirs; local
/// state is never rolled back for a delivery failure.
///
/// Returns `(nodes_paid, deliveries_failed)`.
pub fn send_staking_rewards(
    store: &dyn Storage,
    registry: &NodeRegistry,
    transport: &dyn CrossChainTransport,
    reward_per_chain: Amount,
    height: i64,
) -> CrosschainResult<(u32, u32)> {
    let mut nodes_paid = 0u32;
    let mut failed = 0u32;

    for node in registry.online_nodes(store)? {
        let mut delivered_any = false;
        for chain_id in &node.supported_chains {
            let payout = StakingPayout {
                kind: MSG_WATT_REWARD.into(),
                recipient: node.operator.clone(),
                amount: reward_per_chain.to_string(),
                denom: UTILITY_DENOM.into(),
                block_height: height,
            };
            let bytes = serde_json::to_vec(&payout)
                .map_err(|e| crate::CrosschainError::Serialization(e.to_string()))?;
            match transport.send(chain_id, &bytes) {
                Ok(()) => {
                    delivered_any = true;
                    debug!(
                        operator = %node.operator,
                        chain_id = %chain_id,
                        amount = reward_per_chain,
                        "Sent staking reward payout"
                    );
                }
                Err(err) => {
                    failed += 1;
                    error!(
                        operator = %node.operator,
                        chain_id = %chain_id,
                        %err,
                        "Failed to send staking reward"
                    );
                }
            }
        }
        if delivered_any {
            nodes_paid += 1;
        }
    }

    Ok((nodes_paid, failed))
}

/// Notify the peer chain of a locally mined reward.
pub fn send_reward_notice(
    transport: &dyn CrossChainTransport,
    peer_chain: &str,
    miner: &str,
    reward: Amount,
    height: i64,
    block_time: i64,
) -> CrosschainResult<()> {
    let notice = MinedRewardNotice {
        kind: MSG_REWARD_DISTRIBUTION.into(),
        miner: miner.to_string(),
        reward: reward.to_string(),
        block_height: height,
        timestamp: block_time,
    };
    let bytes = serde_json::to_vec(&notice)
        .map_err(|e| crate::CrosschainError::Serialization(e.to_string()))?;
    transport
        .send(peer_chain, &bytes)
        .map_err(|source| crate::CrosschainError::Delivery {
            chain_id: peer_chain.to_string(),
            source,
        })?;
    info!(peer_chain, miner, reward, height, "Sent mining reward notice");
    Ok(())
}

/// Send an end-of-block sync notice to the configured peer chain.
pub fn send_block_sync(
    transport: &dyn CrossChainTransport,
    peer_chain: &str,
    height: i64,
    block_time: i64,
    difficulty: u64,
) -> CrosschainResult<()> {
    let notice = BlockSyncNotice {
        kind: MSG_BLOCK_SYNC.into(),
        block_height: height,
        block_time,
        difficulty,
    };
    let bytes = serde_json::to_vec(&notice)
        .map_err(|e| crate::CrosschainError::Serialization(e.to_string()))?;
    transport
        .send(peer_chain, &bytes)
        .map_err(|source| crate::CrosschainError::Delivery {
            chain_id: peer_chain.to_string(),
            source,
        })?;
    info!(peer_chain, height, difficulty, "Sent block sync notice");
    Ok(())
}
