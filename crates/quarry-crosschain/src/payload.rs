//! Tagged payload decoding.
//!
//! Each message type has one wire shape, decoded at the boundary into a
//! typed variant; anything malformed is rejected there instead of
//! failing deeper in a handler. Foreign chains serialize token amounts
//! as decimal strings, so reward figures cross the wire as strings.

use crate::{
    CrosschainError, CrosschainResult, MSG_BLOCK_SYNC, MSG_MINING_RIG_UPDATE,
    MSG_POOL_OPERATOR_STAKE, MSG_REWARD_DISTRIBUTION,
};
use quarry_types::Amount;
use serde::{Deserialize, Serialize};

/// Wire shape of a `mining_rig_update` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RigUpdate {
    /// NFT token id on the source chain.
    pub token_id: u64,
    /// Local account that owns the rig.
    pub owner: String,
    /// Chain the rig NFT lives on.
    pub chain_id: String,
    /// NFT contract address.
    pub contract_address: String,
    /// Declared hash power.
    pub hash_power: u64,
    /// Declared power draw.
    pub watt_consumption: u64,
    /// Whether the rig should count toward distribution.
    pub is_active: bool,
}

/// Wire shape of a `pool_operator_stake` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeAttestation {
    /// Operator address on the source chain.
    pub address: String,
    /// Chain the stake is locked on.
    pub chain_id: String,
    /// Whether the source-chain stake requirement is satisfied.
    pub has_staked_watt: bool,
    /// Aggregated pool hash power.
    pub total_hash_power: u64,
}

/// Wire shape of a `reward_distribution` notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardNotice {
    /// Miner credited on the foreign chain.
    pub miner: String,
    /// Reward amount as a decimal string of base units.
    pub reward: String,
    /// Foreign block height of the reward.
    pub block_height: i64,
}

impl RewardNotice {
    /// Parse the decimal reward string.
    pub fn reward_amount(&self) -> CrosschainResult<Amount> {
        self.reward.parse::<Amount>().map_err(|_| {
            CrosschainError::MalformedPayload {
                message_type: MSG_REWARD_DISTRIBUTION.into(),
                reason: format!("reward is not a decimal amount: {:?}", self.reward),
            }
        })
    }
}

/// Wire shape of a `block_sync` notice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncNotice {
    /// Foreign block height.
    pub block_height: i64,
    /// Foreign block time, seconds.
    pub block_time: i64,
    /// Foreign mining difficulty.
    pub difficulty: u64,
}

/// A decoded inbound payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundPayload {
    /// Create or update a mirrored mining rig.
    MiningRigUpdate(RigUpdate),
    /// Record a pool operator's stake attestation.
    PoolOperatorStake(StakeAttestation),
    /// Informational: foreign reward notification.
    RewardDistribution(RewardNotice),
    /// Informational: foreign block sync notice.
    BlockSync(SyncNotice),
}

impl InboundPayload {
    /// Decode `payload` according to `message_type`.
    ///
    /// Unknown tags are reported as [`CrosschainError::UnknownMessageType`]
    /// so the caller can drop the message without retry.
    pub fn decode(message_type: &str, payload: &[u8]) -> CrosschainResult<Self> {
        let malformed = |e: serde_json::Error| CrosschainError::MalformedPayload {
            message_type: message_type.to_string(),
            reason: e.to_string(),
        };
        match message_type {
            MSG_MINING_RIG_UPDATE => Ok(Self::MiningRigUpdate(
                serde_json::from_slice(payload).map_err(malformed)?,
            )),
            MSG_POOL_OPERATOR_STAKE => Ok(Self::PoolOperatorStake(
                serde_json::from_slice(payload).map_err(malformed)?,
            )),
            MSG_REWARD_DISTRIBUTION => Ok(Self::RewardDistribution(
                serde_json::from_slice(payload).map_err(malformed)?,
            )),
            MSG_BLOCK_SYNC => Ok(Self::BlockSync(
                serde_json::from_slice(payload).map_err(malformed)?,
            )),
            other => Err(CrosschainError::UnknownMessageType(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rig_update_decodes() {
        let json = serde_json::json!({
            "token_id": 7,
            "owner": "qry1owner",
            "chain_id": "altcoinchain-2330",
            "contract_address": "0xcafe",
            "hash_power": 9000,
            "watt_consumption": 450,
            "is_active": true
        });
        let payload =
            InboundPayload::decode(MSG_MINING_RIG_UPDATE, json.to_string().as_bytes()).unwrap();
        match payload {
            InboundPayload::MiningRigUpdate(rig) => {
                assert_eq!(rig.token_id, 7);
                assert_eq!(rig.hash_power, 9000);
            }
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    #[test]
    fn unknown_tag_is_reported() {
        let err = InboundPayload::decode("rig_teleport", b"{}").unwrap_err();
        assert!(matches!(err, CrosschainError::UnknownMessageType(t) if t == "rig_teleport"));
    }

    #[test]
    fn malformed_shape_is_rejected_at_the_boundary() {
        let err = InboundPayload::decode(MSG_MINING_RIG_UPDATE, b"{\"token_id\": \"seven\"}")
            .unwrap_err();
        assert!(matches!(err, CrosschainError::MalformedPayload { .. }));
    }

    #[test]
    fn reward_notice_parses_decimal_string() {
        let notice = RewardNotice {
            miner: "0xminer".into(),
            reward: "50000000000000000".into(),
            block_height: 12,
        };
        assert_eq!(notice.reward_amount().unwrap(), 50_000_000_000_000_000);

        let bad = RewardNotice {
            reward: "lots".into(),
            ..notice
        };
        assert!(bad.reward_amount().is_err());
    }
}
