//! Mining attempt validation.

use crate::{encode_public_inputs, MiningError, MiningResult, ProofVerifier, RewardLedger, TokenCustody};
use quarry_types::{BlockContext, RewardBatch};
use std::sync::Arc;
use tracing::{debug, info};

/// Validates mining attempts against the current difficulty target.
///
/// An attempt moves through three implicit states: pending (before
/// verification), verified (proof accepted, reward issued), rejected
/// (terminal). Nothing intermediate is persisted; the whole transition
/// happens inside one call.
pub struct AttemptValidator {
    verifier: Arc<dyn ProofVerifier>,
}

impl AttemptValidator {
    /// Create a validator around a proof-verification collaborator.
    pub fn new(verifier: Arc<dyn ProofVerifier>) -> Self {
        Self { verifier }
    }

    /// Process a mining attempt.
    ///
    /// Verifies `proof` against the public inputs derived from the block
    /// context, difficulty, and miner address. On success the ledger's
    /// per-attempt issuance path runs and a [`RewardBatch`] is returned
    /// for settlement. A failed verification is terminal for the attempt:
    /// no retry, no state change.
    pub fn process(
        &self,
        ctx: &BlockContext,
        difficulty: u64,
        miner: &str,
        proof: &[u8],
        ledger: &RewardLedger,
        custody: &dyn TokenCustody,
    ) -> MiningResult<RewardBatch> {
        let public_inputs = encode_public_inputs(ctx, difficulty, miner);

        if !self.verifier.verify(proof, &public_inputs, ctx) {
            debug!(miner, height = ctx.height, "Mining attempt rejected");
            return Err(MiningError::InvalidProof);
        }

        let reward = ledger.issue_attempt_reward(custody, miner, ctx.height)?;
        info!(
            miner,
            height = ctx.height,
            reward,
            "Mining attempt verified"
        );

        Ok(RewardBatch {
            height: ctx.height,
            block_hash: ctx.block_hash.to_vec(),
            timestamp: ctx.timestamp_ms,
            proof: proof.to_vec(),
            tx_count: ctx.tx_count,
        })
    }
}
