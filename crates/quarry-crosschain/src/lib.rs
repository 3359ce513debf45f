//! # quarry-crosschain
//!
//! Cross-chain state synchronization for the quarry settlement engine.
//!
//! Inbound: already-authenticated messages from foreign chains are
//! decoded into tagged payloads, deduplicated per `(source_chain, nonce)`,
//! and applied as ordinary state transitions (rig upserts, stake
//! attestations, analytics updates).
//!
//! Outbound: flat staking payouts, mined-reward notices, and block-sync
//! notices are packaged as JSON payloads and handed to the transport
//! collaborator; delivery failures are logged, never retried here.

mod error;
mod message;
mod outbound;
mod payload;
mod processor;
mod transport;

pub use error::{CrosschainError, CrosschainResult};
pub use message::CrossChainMessage;
pub use outbound::{send_block_sync, send_reward_notice, send_staking_rewards, StakingPayout};
pub use payload::{
    InboundPayload, RewardNotice, RigUpdate, StakeAttestation, SyncNotice,
};
pub use processor::{Applied, MessageProcessor};
pub use transport::{CrossChainTransport, TransportError, TransportResult};

/// Wire tag for mining rig updates.
pub const MSG_MINING_RIG_UPDATE: &str = "mining_rig_update";
/// Wire tag for pool-operator stake attestations.
pub const MSG_POOL_OPERATOR_STAKE: &str = "pool_operator_stake";
/// Wire tag for foreign reward notifications.
pub const MSG_REWARD_DISTRIBUTION: &str = "reward_distribution";
/// Wire tag for block-sync notices.
pub const MSG_BLOCK_SYNC: &str = "block_sync";
/// Wire tag for outbound utility-token payouts.
pub const MSG_WATT_REWARD: &str = "watt_reward";
