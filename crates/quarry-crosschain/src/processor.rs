//! Inbound message dispatch.

use crate::{
    CrossChainMessage, CrosschainError, CrosschainResult, InboundPayload, RewardNotice,
    RigUpdate, StakeAttestation, SyncNotice,
};
use quarry_storage::{Storage, WriteBatch};
use quarry_types::keys::{self, cross_chain_message_key};
use quarry_types::{ChainAnalytics, MiningRig, PoolOperator};
use tracing::{debug, info};

/// What a successfully processed message did, for event emission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    /// A mining rig was created or updated.
    RigUpserted(MiningRig),
    /// A pool-operator attestation was recorded.
    OperatorRecorded(PoolOperator),
    /// An informational message updated per-chain analytics.
    AnalyticsUpdated {
        /// Chain whose analytics changed.
        chain_id: String,
    },
}

/// Typed dispatch table over inbound cross-chain messages.
///
/// Every message is deduplicated per `(source_chain, nonce)` before its
/// handler runs. Entity writes and the dedup marker commit in a single
/// batch, so a rejected message can be redelivered corrected under the
/// same nonce, and an applied message can never be replayed.
#[derive(Debug, Clone, Default)]
pub struct MessageProcessor;

impl MessageProcessor {
    /// Create a processor.
    pub fn new() -> Self {
        Self
    }

    /// Validate, deduplicate, decode, and apply one message.
    ///
    /// `block_time` is the local block timestamp (seconds) stamped onto
    /// mutated entities.
    pub fn process(
        &self,
        store: &dyn Storage,
        msg: &CrossChainMessage,
        block_time: i64,
    ) -> CrosschainResult<Applied> {
        msg.validate()?;

        let dedup_key = cross_chain_message_key(&msg.source_chain, msg.nonce);
        if store.contains(&dedup_key)? {
            return Err(CrosschainError::DuplicateMessage {
                source_chain: msg.source_chain.clone(),
                nonce: msg.nonce,
            });
        }

        let payload = InboundPayload::decode(&msg.message_type, &msg.payload)?;
        let mut batch = WriteBatch::with_capacity(2);
        let applied = match payload {
            InboundPayload::MiningRigUpdate(update) => {
                self.apply_rig_update(&mut batch, update, block_time)?
            }
            InboundPayload::PoolOperatorStake(attestation) => {
                self.apply_stake_attestation(&mut batch, attestation)?
            }
            InboundPayload::RewardDistribution(notice) => {
                self.apply_reward_notice(store, &mut batch, &msg.source_chain, notice)?
            }
            InboundPayload::BlockSync(notice) => {
                self.apply_sync_notice(store, &mut batch, &msg.source_chain, notice)?
            }
        };

        // Entity and dedup marker land atomically; a storage failure
        // leaves the message unapplied and redeliverable.
        batch.put(dedup_key, msg.timestamp.to_be_bytes().to_vec());
        store.write_batch(batch)?;
        debug!(
            source_chain = %msg.source_chain,
            message_type = %msg.message_type,
            nonce = msg.nonce,
            "Processed cross-chain message"
        );
        Ok(applied)
    }

    fn apply_rig_update(
        &self,
        batch: &mut WriteBatch,
        update: RigUpdate,
        block_time: i64,
    ) -> CrosschainResult<Applied> {
        if update.hash_power == 0 {
            return Err(CrosschainError::Validation(
                "invalid hash power: 0".into(),
            ));
        }
        if update.chain_id.is_empty() {
            return Err(CrosschainError::Validation("chain id cannot be empty".into()));
        }

        let rig = MiningRig {
            token_id: update.token_id,
            owner: update.owner,
            chain_id: update.chain_id,
            contract_address: update.contract_address,
            hash_power: update.hash_power,
            watt_consumption: update.watt_consumption,
            is_active: update.is_active,
            last_updated: block_time,
        };
        self.stage(batch, rig.store_key(), &rig)?;

        info!(
            token_id = rig.token_id,
            chain_id = %rig.chain_id,
            hash_power = rig.hash_power,
            watt_consumption = rig.watt_consumption,
            "Updated mining rig"
        );
        Ok(Applied::RigUpserted(rig))
    }

    fn apply_stake_attestation(
        &self,
        batch: &mut WriteBatch,
        attestation: StakeAttestation,
    ) -> CrosschainResult<Applied> {
        // The relay already verified the remote stake; the attestation
        // itself must still assert it.
        if !attestation.has_staked_watt {
            return Err(CrosschainError::Validation(
                "pool operator has not staked required WATT tokens".into(),
            ));
        }
        if attestation.address.is_empty() {
            return Err(CrosschainError::Validation("address cannot be empty".into()));
        }

        let operator = PoolOperator {
            address: attestation.address,
            chain_id: attestation.chain_id,
            has_staked_watt: attestation.has_staked_watt,
            total_hash_power: attestation.total_hash_power,
        };
        self.stage(batch, operator.store_key(), &operator)?;

        info!(
            address = %operator.address,
            chain_id = %operator.chain_id,
            total_hash_power = operator.total_hash_power,
            "Registered pool operator"
        );
        Ok(Applied::OperatorRecorded(operator))
    }

    fn apply_reward_notice(
        &self,
        store: &dyn Storage,
        batch: &mut WriteBatch,
        source_chain: &str,
        notice: RewardNotice,
    ) -> CrosschainResult<Applied> {
        let reward = notice.reward_amount()?;
        let mut analytics = self.load_analytics(store, source_chain)?;
        analytics.messages_seen += 1;
        analytics.last_reported_height = analytics.last_reported_height.max(notice.block_height);
        analytics.reported_reward_total = analytics.reported_reward_total.saturating_add(reward);
        self.stage(batch, analytics.store_key(), &analytics)?;

        info!(
            source_chain,
            miner = %notice.miner,
            reward,
            foreign_height = notice.block_height,
            "Recorded foreign mining reward"
        );
        Ok(Applied::AnalyticsUpdated {
            chain_id: source_chain.to_string(),
        })
    }

    fn apply_sync_notice(
        &self,
        store: &dyn Storage,
        batch: &mut WriteBatch,
        source_chain: &str,
        notice: SyncNotice,
    ) -> CrosschainResult<Applied> {
        let mut analytics = self.load_analytics(store, source_chain)?;
        analytics.messages_seen += 1;
        analytics.last_reported_height = analytics.last_reported_height.max(notice.block_height);
        self.stage(batch, analytics.store_key(), &analytics)?;

        debug!(
            source_chain,
            foreign_height = notice.block_height,
            foreign_difficulty = notice.difficulty,
            "Recorded block sync notice"
        );
        Ok(Applied::AnalyticsUpdated {
            chain_id: source_chain.to_string(),
        })
    }

    fn load_analytics(
        &self,
        store: &dyn Storage,
        chain_id: &str,
    ) -> CrosschainResult<ChainAnalytics> {
        match store.get(&keys::chain_analytics_key(chain_id))? {
            Some(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| CrosschainError::Serialization(e.to_string())),
            None => Ok(ChainAnalytics {
                chain_id: chain_id.to_string(),
                ..ChainAnalytics::default()
            }),
        }
    }

    fn stage<T: serde::Serialize>(
        &self,
        batch: &mut WriteBatch,
        key: Vec<u8>,
        value: &T,
    ) -> CrosschainResult<()> {
        let bytes = serde_json::to_vec(value)
            .map_err(|e| CrosschainError::Serialization(e.to_string()))?;
        batch.put(key, bytes);
        Ok(())
    }
}
