//! Store key prefixes and composite-key encoding.
//!
//! Every persisted entity type owns a string prefix; keys are
//! `<prefix><composite id>` so a prefix range scan yields exactly one
//! entity type. The reward-distribution pass depends on iterating
//! `mining_rig/*` this way.

/// Prefix for mining rig entries, keyed by `token_id-chain_id`.
pub const MINING_RIG_PREFIX: &str = "mining_rig/";

/// Prefix for pool operator entries, keyed by `address-chain_id`.
pub const POOL_OPERATOR_PREFIX: &str = "pool_operator/";

/// Prefix for staking node entries, keyed by operator address.
pub const STAKING_NODE_PREFIX: &str = "staking_node/";

/// Prefix for the cross-chain dedup seen-set, keyed by `source_chain/nonce`.
pub const CROSS_CHAIN_MESSAGE_PREFIX: &str = "cross_chain_message/";

/// Prefix for per-chain analytics entries, keyed by chain id.
pub const CHAIN_ANALYTICS_PREFIX: &str = "chain_analytics/";

/// Prefix for consensus-owned scalars (difficulty state).
pub const CONSENSUS_PREFIX: &str = "consensus/";

/// Key of the persisted difficulty state.
pub fn difficulty_state_key() -> Vec<u8> {
    format!("{CONSENSUS_PREFIX}difficulty").into_bytes()
}

/// Key of the retarget-window anchor (height and timestamp of the last
/// retarget boundary).
pub fn retarget_anchor_key() -> Vec<u8> {
    format!("{CONSENSUS_PREFIX}retarget_anchor").into_bytes()
}

/// Key of a mining rig, unique per `(token_id, chain_id)`.
pub fn mining_rig_key(token_id: u64, chain_id: &str) -> Vec<u8> {
    format!("{MINING_RIG_PREFIX}{token_id}-{chain_id}").into_bytes()
}

/// Key of a pool operator, unique per `(address, chain_id)`.
pub fn pool_operator_key(address: &str, chain_id: &str) -> Vec<u8> {
    format!("{POOL_OPERATOR_PREFIX}{address}-{chain_id}").into_bytes()
}

/// Key of a staking node, unique per operator.
pub fn staking_node_key(operator: &str) -> Vec<u8> {
    format!("{STAKING_NODE_PREFIX}{operator}").into_bytes()
}

/// Dedup key of an inbound message, unique per `(source_chain, nonce)`.
pub fn cross_chain_message_key(source_chain: &str, nonce: u64) -> Vec<u8> {
    format!("{CROSS_CHAIN_MESSAGE_PREFIX}{source_chain}/{nonce}").into_bytes()
}

/// Key of a chain's analytics record.
pub fn chain_analytics_key(chain_id: &str) -> Vec<u8> {
    format!("{CHAIN_ANALYTICS_PREFIX}{chain_id}").into_bytes()
}
