//! Test data generators.

use quarry_crosschain::{CrossChainMessage, MSG_MINING_RIG_UPDATE, MSG_POOL_OPERATOR_STAKE};
use quarry_types::{BlockContext, MiningRig, StakingNode, MIN_NODE_STAKE};

/// A block context with a recognizable hash at the given height.
pub fn block_ctx(height: i64, timestamp_ms: i64) -> BlockContext {
    let mut block_hash = [0u8; 32];
    block_hash[..8].copy_from_slice(&height.to_be_bytes());
    let mut prev_block_hash = [0u8; 32];
    prev_block_hash[..8].copy_from_slice(&(height - 1).to_be_bytes());
    BlockContext {
        height,
        timestamp_ms,
        block_hash,
        prev_block_hash,
        tx_count: 1,
    }
}

/// An active rig owned by `owner` with the given hash power.
pub fn rig(token_id: u64, owner: &str, hash_power: u64) -> MiningRig {
    MiningRig {
        token_id,
        owner: owner.to_string(),
        chain_id: "altcoinchain-2330".into(),
        contract_address: "0xrig".into(),
        hash_power,
        watt_consumption: hash_power / 2,
        is_active: true,
        last_updated: 0,
    }
}

/// A staking node at exactly the minimum stake.
pub fn staking_node(operator: &str, chains: &[&str]) -> StakingNode {
    StakingNode {
        operator: operator.to_string(),
        moniker: format!("{operator}-node"),
        staked_amount: MIN_NODE_STAKE,
        is_online: true,
        last_block_signed: 0,
        voting_power: 21,
        supported_chains: chains.iter().map(|c| c.to_string()).collect(),
    }
}

/// An authenticated rig-update message carrying `rig` as its payload.
pub fn rig_update_message(rig: &MiningRig, nonce: u64) -> CrossChainMessage {
    let payload = serde_json::json!({
        "token_id": rig.token_id,
        "owner": rig.owner,
        "chain_id": rig.chain_id,
        "contract_address": rig.contract_address,
        "hash_power": rig.hash_power,
        "watt_consumption": rig.watt_consumption,
        "is_active": rig.is_active,
    });
    CrossChainMessage {
        source_chain: rig.chain_id.clone(),
        message_type: MSG_MINING_RIG_UPDATE.into(),
        payload: payload.to_string().into_bytes(),
        sender: "0xbridge".into(),
        nonce,
        timestamp: 1_700_000_000,
    }
}

/// A pool-operator stake attestation message.
pub fn stake_attestation_message(
    address: &str,
    chain_id: &str,
    has_staked_watt: bool,
    nonce: u64,
) -> CrossChainMessage {
    let payload = serde_json::json!({
        "address": address,
        "chain_id": chain_id,
        "has_staked_watt": has_staked_watt,
        "total_hash_power": 12_000u64,
    });
    CrossChainMessage {
        source_chain: chain_id.to_string(),
        message_type: MSG_POOL_OPERATOR_STAKE.into(),
        payload: payload.to_string().into_bytes(),
        sender: "0xbridge".into(),
        nonce,
        timestamp: 1_700_000_000,
    }
}
