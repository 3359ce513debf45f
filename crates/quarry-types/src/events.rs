//! Block-level events.
//!
//! Events are collected into a per-block buffer by the engine and
//! mirrored to `tracing` at emission time. They exist for the query/RPC
//! layer; nothing in the core reads them back.

use crate::Amount;
use serde::{Deserialize, Serialize};

/// A typed event emitted during block processing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineEvent {
    /// Difficulty was retargeted at an adjustment boundary.
    DifficultyAdjusted {
        /// Difficulty before the retarget.
        old_difficulty: u64,
        /// Difficulty after clamping.
        new_difficulty: u64,
        /// Height of the retarget.
        height: i64,
    },
    /// A staking node was registered.
    StakingNodeCreated {
        /// Operator account.
        operator: String,
        /// Node moniker.
        moniker: String,
        /// Computed voting power.
        voting_power: u64,
    },
    /// A staking node signed after being offline.
    StakingNodeOnline {
        /// Operator account.
        operator: String,
        /// Height of the transition.
        height: i64,
    },
    /// A staking node missed a block after being online.
    StakingNodeOffline {
        /// Operator account.
        operator: String,
        /// Height of the transition.
        height: i64,
    },
    /// A mining rig was created or updated from a foreign chain.
    MiningRigUpdated {
        /// NFT token id.
        token_id: u64,
        /// Source chain.
        chain_id: String,
        /// Declared hash power.
        hash_power: u64,
        /// Declared power draw.
        watt_consumption: u64,
    },
    /// An inbound cross-chain message was applied.
    CrossChainMessageProcessed {
        /// Source chain.
        source_chain: String,
        /// Message kind tag.
        message_type: String,
        /// Message nonce.
        nonce: u64,
    },
    /// End-of-block rewards were distributed.
    RewardsDistributed {
        /// Height of the block.
        height: i64,
        /// Total mining reward paid out, base units.
        total_mining_reward: Amount,
        /// Number of rig owners paid.
        miners_paid: u32,
        /// Number of online nodes paid the flat staking reward.
        nodes_paid: u32,
    },
    /// A reward batch was handed to the L1 collaborator.
    BatchSubmitted {
        /// Height of the batch.
        height: i64,
        /// Transaction count of the batch.
        tx_count: u32,
    },
}
