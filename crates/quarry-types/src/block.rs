//! Block context handed to lifecycle hooks.

use serde::{Deserialize, Serialize};

/// Per-block chain state provided by the consensus-engine collaborator.
///
/// The engine never reads wall-clock time; every timestamp used in core
/// logic comes from this context so that all validating nodes see the
/// same values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockContext {
    /// Block height, strictly increasing.
    pub height: i64,
    /// Block timestamp in milliseconds.
    pub timestamp_ms: i64,
    /// Hash of the current block (32 bytes).
    pub block_hash: [u8; 32],
    /// Hash of the previous block (32 bytes).
    pub prev_block_hash: [u8; 32],
    /// Number of transactions in the block.
    pub tx_count: u32,
}

impl BlockContext {
    /// Create a context for genesis-like conditions (tests and seeding).
    pub fn at_height(height: i64, timestamp_ms: i64) -> Self {
        Self {
            height,
            timestamp_ms,
            block_hash: [0u8; 32],
            prev_block_hash: [0u8; 32],
            tx_count: 0,
        }
    }
}
