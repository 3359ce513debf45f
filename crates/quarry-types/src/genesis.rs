//! Genesis state.

use crate::error::{ParamsError, ParamsResult};
use crate::{MiningRig, Params, PoolOperator, StakingNode};
use serde::{Deserialize, Serialize};

/// Initial engine state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisState {
    /// Module parameters.
    #[serde(default)]
    pub params: Params,
    /// Pre-registered mining rigs.
    #[serde(default)]
    pub mining_rigs: Vec<MiningRig>,
    /// Pre-attested pool operators.
    #[serde(default)]
    pub pool_operators: Vec<PoolOperator>,
    /// Pre-registered staking nodes.
    #[serde(default)]
    pub staking_nodes: Vec<StakingNode>,
    /// Height the chain resumes from.
    #[serde(default)]
    pub last_block_height: i64,
}

impl GenesisState {
    /// Validate the genesis state before seeding the store.
    pub fn validate(&self) -> ParamsResult<()> {
        for rig in &self.mining_rigs {
            if rig.token_id == 0 {
                return Err(ParamsError::InvalidGenesis(
                    "mining rig token id cannot be zero".into(),
                ));
            }
            if rig.owner.is_empty() {
                return Err(ParamsError::InvalidGenesis(
                    "mining rig owner cannot be empty".into(),
                ));
            }
            if rig.chain_id.is_empty() {
                return Err(ParamsError::InvalidGenesis(
                    "mining rig chain id cannot be empty".into(),
                ));
            }
        }
        for operator in &self.pool_operators {
            if operator.address.is_empty() {
                return Err(ParamsError::InvalidGenesis(
                    "pool operator address cannot be empty".into(),
                ));
            }
            if operator.chain_id.is_empty() {
                return Err(ParamsError::InvalidGenesis(
                    "pool operator chain id cannot be empty".into(),
                ));
            }
        }
        for node in &self.staking_nodes {
            if node.operator.is_empty() {
                return Err(ParamsError::InvalidGenesis(
                    "staking node operator cannot be empty".into(),
                ));
            }
            if node.staked_amount < self.params.min_stake_amount {
                return Err(ParamsError::InvalidGenesis(format!(
                    "insufficient stake for node {}: {}",
                    node.operator, node.staked_amount
                )));
            }
        }
        self.params.validate()
    }
}
