//! Local stand-ins for the engine's capability traits.
//!
//! A production deployment wires real verifier, custody, L1, and
//! transport backends here. The local versions are deterministic and
//! in-process so a single node can produce blocks on its own.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use parking_lot::Mutex;
use quarry_crosschain::{CrossChainTransport, TransportError, TransportResult};
use quarry_mining::{CustodyError, CustodyResult, ProofVerifier, TokenCustody};
use quarry_settlement::L1Client;
use quarry_types::{Amount, BlockContext, RewardBatch};
use std::collections::HashMap;
use tracing::{debug, info};

type Blake2b256 = Blake2b<U32>;

/// Accepts a proof when `Blake2b256(proof || public_inputs)` read as a
/// big-endian u64 prefix falls under a fixed threshold.
pub struct HashThresholdVerifier {
    threshold: u64,
}

impl HashThresholdVerifier {
    /// Create a verifier with the given acceptance threshold.
    pub fn new(threshold: u64) -> Self {
        Self { threshold }
    }
}

impl ProofVerifier for HashThresholdVerifier {
    fn verify(&self, proof: &[u8], public_inputs: &[u8], _ctx: &BlockContext) -> bool {
        let mut hasher = Blake2b256::new();
        hasher.update(proof);
        hasher.update(public_inputs);
        let digest = hasher.finalize();
        let prefix = u64::from_be_bytes(digest[..8].try_into().unwrap_or([0xFF; 8]));
        prefix <= self.threshold
    }
}

/// In-process token ledger keyed by `(account, denom)`.
#[derive(Default)]
pub struct LocalCustody {
    balances: Mutex<HashMap<(String, String), Amount>>,
}

impl LocalCustody {
    /// Current balance of an account in a denom.
    pub fn balance(&self, account: &str, denom: &str) -> Amount {
        self.balances
            .lock()
            .get(&(account.to_string(), denom.to_string()))
            .copied()
            .unwrap_or(0)
    }
}

impl TokenCustody for LocalCustody {
    fn mint(&self, account: &str, denom: &str, amount: Amount) -> CustodyResult<()> {
        let mut balances = self.balances.lock();
        let entry = balances
            .entry((account.to_string(), denom.to_string()))
            .or_insert(0);
        *entry += amount;
        Ok(())
    }

    fn transfer(&self, from: &str, to: &str, denom: &str, amount: Amount) -> CustodyResult<()> {
        if !self.is_valid_address(to) {
            return Err(CustodyError::InvalidAddress(to.to_string()));
        }
        let mut balances = self.balances.lock();
        let from_key = (from.to_string(), denom.to_string());
        let available = balances.get(&from_key).copied().unwrap_or(0);
        if available < amount {
            return Err(CustodyError::TransferFailed(format!(
                "insufficient balance in {from}: {available} < {amount}"
            )));
        }
        *balances.get_mut(&from_key).unwrap_or(&mut 0) = available - amount;
        *balances
            .entry((to.to_string(), denom.to_string()))
            .or_insert(0) += amount;
        debug!(from, to, denom, amount, "Local transfer");
        Ok(())
    }
}

/// L1 client that logs batches instead of anchoring them.
#[derive(Default)]
pub struct LoggingL1Client;

impl L1Client for LoggingL1Client {
    fn submit_batch(&self, batch: &RewardBatch) -> Result<(), String> {
        info!(
            height = batch.height,
            tx_count = batch.tx_count,
            block_hash = %hex::encode(&batch.block_hash),
            "L1 batch (local, not anchored)"
        );
        Ok(())
    }
}

/// Transport that logs outbound payloads instead of relaying them.
#[derive(Default)]
pub struct LoggingTransport;

impl CrossChainTransport for LoggingTransport {
    fn send(&self, chain_id: &str, payload: &[u8]) -> TransportResult<()> {
        if chain_id.is_empty() {
            return Err(TransportError("empty destination chain".into()));
        }
        debug!(
            chain_id,
            payload = %String::from_utf8_lossy(payload),
            "Outbound payload (local, not relayed)"
        );
        Ok(())
    }
}
