//! Public-input encoding for proof verification.

use quarry_types::BlockContext;

/// Encode the public inputs for a mining attempt.
///
/// Layout is part of the external verification contract and must match
/// the proof system bit-for-bit:
/// `block_hash(32) || prev_block_hash(32) || difficulty_be(8) || miner bytes`.
pub fn encode_public_inputs(ctx: &BlockContext, difficulty: u64, miner: &str) -> Vec<u8> {
    let miner_bytes = miner.as_bytes();
    let mut data = Vec::with_capacity(64 + 8 + miner_bytes.len());
    data.extend_from_slice(&ctx.block_hash);
    data.extend_from_slice(&ctx.prev_block_hash);
    data.extend_from_slice(&difficulty.to_be_bytes());
    data.extend_from_slice(miner_bytes);
    data
}
