//! # quarry-settlement
//!
//! L1 settlement for the quarry engine: verified work is packaged as
//! [`RewardBatch`] descriptors and forwarded to the base-layer
//! submission collaborator. Batches are immutable once handed over;
//! idempotent re-submission and retry belong to the collaborator.

use quarry_types::RewardBatch;
use thiserror::Error;
use tracing::{error, info};

/// Settlement errors.
#[derive(Error, Debug)]
pub enum SettlementError {
    /// The L1 collaborator rejected the batch.
    #[error("Batch submission failed at height {height}: {reason}")]
    Submission {
        /// Height of the rejected batch.
        height: i64,
        /// Collaborator-reported reason.
        reason: String,
    },
}

/// Result type for settlement operations.
pub type SettlementResult<T> = Result<T, SettlementError>;

/// Base-layer submission capability.
pub trait L1Client: Send + Sync {
    /// Submit one batch for anchoring. Implementations own idempotency.
    fn submit_batch(&self, batch: &RewardBatch) -> Result<(), String>;
}

/// Forwards reward batches to the L1 collaborator.
pub struct SettlementEmitter {
    client: std::sync::Arc<dyn L1Client>,
}

impl SettlementEmitter {
    /// Create an emitter around an L1 client.
    pub fn new(client: std::sync::Arc<dyn L1Client>) -> Self {
        Self { client }
    }

    /// Submit a batch. Failures are surfaced to the caller, not retried.
    pub fn submit(&self, batch: &RewardBatch) -> SettlementResult<()> {
        match self.client.submit_batch(batch) {
            Ok(()) => {
                info!(
                    height = batch.height,
                    tx_count = batch.tx_count,
                    block_hash = %hex::encode(&batch.block_hash),
                    "Submitted reward batch to L1"
                );
                Ok(())
            }
            Err(reason) => {
                error!(height = batch.height, %reason, "Batch submission failed");
                Err(SettlementError::Submission {
                    height: batch.height,
                    reason,
                })
            }
        }
    }
}
