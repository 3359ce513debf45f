//! Reward ledger: halving schedule, issuance, and proportional split.

use crate::{CustodyError, MiningError, MiningResult, TokenCustody};
use quarry_storage::Storage;
use quarry_types::keys::MINING_RIG_PREFIX;
use quarry_types::{Amount, MiningRig, Params, MODULE_ACCOUNT, NATIVE_DENOM};
use tracing::{debug, info, warn};

/// Halvings after which the reward is pinned to zero. Shifting a u128 by
/// 64+ would still be defined, but the schedule treats 64 halvings as
/// fully emitted, matching the settlement contract on the foreign chain.
const MAX_HALVINGS: i64 = 64;

/// Result of one end-of-block mining distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DistributionOutcome {
    /// Sum actually paid out, base units.
    pub total_paid: Amount,
    /// Owners that received a non-zero reward.
    pub miners_paid: u32,
    /// Total hash power of active rigs in this pass.
    pub total_hash_power: u64,
}

/// Computes and pays block rewards.
///
/// All arithmetic is unsigned integer math with `u128` intermediates;
/// two conforming nodes running the same state produce bit-identical
/// payouts.
#[derive(Debug, Clone)]
pub struct RewardLedger {
    initial_reward: Amount,
    halving_interval: i64,
}

impl RewardLedger {
    /// Create a ledger from validated module parameters.
    pub fn from_params(params: &Params) -> Self {
        Self {
            initial_reward: params.initial_block_reward,
            halving_interval: params.halving_interval,
        }
    }

    /// Create with explicit schedule values (for testing).
    pub fn with_schedule(initial_reward: Amount, halving_interval: i64) -> Self {
        Self {
            initial_reward,
            halving_interval,
        }
    }

    /// Block reward at `height` under the halving schedule.
    pub fn base_reward(&self, height: i64) -> Amount {
        let halvings = height / self.halving_interval;
        if halvings >= MAX_HALVINGS {
            return 0;
        }
        self.initial_reward >> halvings as u32
    }

    /// Mint the full block reward to a single verified miner.
    ///
    /// This is the per-attempt issuance path: it runs inside `mine` once
    /// a proof verifies, independent of the end-of-block split.
    pub fn issue_attempt_reward(
        &self,
        custody: &dyn TokenCustody,
        miner: &str,
        height: i64,
    ) -> MiningResult<Amount> {
        let reward = self.base_reward(height);
        if reward == 0 {
            debug!(height, miner, "Emission exhausted, no attempt reward");
            return Ok(0);
        }
        custody.mint(MODULE_ACCOUNT, NATIVE_DENOM, reward)?;
        custody.transfer(MODULE_ACCOUNT, miner, NATIVE_DENOM, reward)?;
        info!(miner, reward, height, "Issued mining attempt reward");
        Ok(reward)
    }

    /// Distribute the block reward across active rigs by hash power.
    ///
    /// Each rig owner receives `floor(base_reward * hash_power / total)`.
    /// A malformed owner address is logged and skipped; any other custody
    /// failure aborts, since the collaborator guarantees the mint/transfer
    /// pair rolled back atomically.
    pub fn distribute_mining_rewards(
        &self,
        store: &dyn Storage,
        custody: &dyn TokenCustody,
        height: i64,
    ) -> MiningResult<DistributionOutcome> {
        let rigs = active_rigs(store)?;
        let total_hash_power: u64 = rigs.iter().map(|r| r.hash_power).sum();
        if total_hash_power == 0 {
            return Err(MiningError::NoActiveMiners);
        }

        let base_reward = self.base_reward(height);
        let mut total_paid: Amount = 0;
        let mut miners_paid = 0u32;

        for rig in &rigs {
            let reward = base_reward * rig.hash_power as u128 / total_hash_power as u128;
            if reward == 0 {
                continue;
            }
            if !custody.is_valid_address(&rig.owner) {
                warn!(
                    owner = %rig.owner,
                    token_id = rig.token_id,
                    chain_id = %rig.chain_id,
                    "Skipping rig with malformed owner address"
                );
                continue;
            }
            match self.pay(custody, &rig.owner, reward) {
                Ok(()) => {
                    total_paid += reward;
                    miners_paid += 1;
                    info!(
                        recipient = %rig.owner,
                        amount = reward,
                        hash_power = rig.hash_power,
                        "Distributed mining reward"
                    );
                }
                Err(CustodyError::InvalidAddress(addr)) => {
                    warn!(owner = %addr, "Skipping rig with unresolvable owner");
                }
                Err(err) => return Err(err.into()),
            }
        }

        Ok(DistributionOutcome {
            total_paid,
            miners_paid,
            total_hash_power,
        })
    }

    fn pay(&self, custody: &dyn TokenCustody, owner: &str, amount: Amount) -> Result<(), CustodyError> {
        custody.mint(MODULE_ACCOUNT, NATIVE_DENOM, amount)?;
        custody.transfer(MODULE_ACCOUNT, owner, NATIVE_DENOM, amount)
    }
}

/// All rigs with `is_active = true`, in store key order.
pub fn active_rigs(store: &dyn Storage) -> MiningResult<Vec<MiningRig>> {
    let mut rigs = Vec::new();
    for (key, value) in store.scan_prefix(MINING_RIG_PREFIX.as_bytes())? {
        let rig: MiningRig = serde_json::from_slice(&value).map_err(|e| {
            MiningError::CorruptEntry(format!("{}: {e}", String::from_utf8_lossy(&key)))
        })?;
        if rig.is_active {
            rigs.push(rig);
        }
    }
    Ok(rigs)
}

/// Sum of hash power over all active rigs.
pub fn total_hash_power(store: &dyn Storage) -> MiningResult<u64> {
    Ok(active_rigs(store)?.iter().map(|r| r.hash_power).sum())
}
