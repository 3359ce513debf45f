//! The engine proper.

use crate::{EngineError, EngineResult};
use parking_lot::Mutex;
use quarry_consensus::{DifficultyController, DifficultyState};
use quarry_crosschain::{
    send_block_sync, send_reward_notice, send_staking_rewards, Applied, CrossChainMessage,
    CrossChainTransport, CrosschainError, MessageProcessor,
};
use quarry_mining::{
    AttemptValidator, MiningError, ProofVerifier, RewardLedger, TokenCustody,
};
use quarry_registry::{NodeRegistry, StatusTransition};
use quarry_settlement::{L1Client, SettlementEmitter};
use quarry_storage::Storage;
use quarry_types::{
    keys, Amount, BlockContext, EngineEvent, GenesisState, Params, RewardBatch, StakingNode,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Height and timestamp of the last retarget boundary, used to measure
/// the observed window duration at the next one.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct RetargetAnchor {
    height: i64,
    timestamp_ms: i64,
}

/// A verified attempt held until end-of-block, when the peer chain is
/// notified of the payout.
#[derive(Debug, Clone)]
struct MinedReward {
    miner: String,
    reward: Amount,
}

/// The mining consensus and cross-chain settlement engine.
///
/// The sole writer of the authoritative store. All transitions for one
/// block run on a single logical thread in a fixed order; nothing here
/// reads wall-clock time or iterates unordered maps, so every
/// conforming node reaches bit-identical state for the same block.
pub struct Engine {
    store: Arc<dyn Storage>,
    params: Params,
    controller: DifficultyController,
    ledger: RewardLedger,
    registry: NodeRegistry,
    processor: MessageProcessor,
    validator: AttemptValidator,
    custody: Arc<dyn TokenCustody>,
    transport: Arc<dyn CrossChainTransport>,
    emitter: SettlementEmitter,
    pending_batches: Mutex<Vec<RewardBatch>>,
    pending_rewards: Mutex<Vec<MinedReward>>,
    events: Mutex<Vec<EngineEvent>>,
}

impl Engine {
    /// Construct an engine from validated parameters and capability
    /// collaborators.
    ///
    /// Misconfiguration is returned as an error here, never raised later
    /// during block processing.
    pub fn new(
        store: Arc<dyn Storage>,
        params: Params,
        verifier: Arc<dyn ProofVerifier>,
        custody: Arc<dyn TokenCustody>,
        l1_client: Arc<dyn L1Client>,
        transport: Arc<dyn CrossChainTransport>,
    ) -> EngineResult<Self> {
        params.validate()?;
        let controller = DifficultyController::from_params(&params);
        let ledger = RewardLedger::from_params(&params);
        let registry = NodeRegistry::new(params.min_stake_amount);
        Ok(Self {
            store,
            params,
            controller,
            ledger,
            registry,
            processor: MessageProcessor::new(),
            validator: AttemptValidator::new(verifier),
            custody,
            transport,
            emitter: SettlementEmitter::new(l1_client),
            pending_batches: Mutex::new(Vec::new()),
            pending_rewards: Mutex::new(Vec::new()),
            events: Mutex::new(Vec::new()),
        })
    }

    /// Seed the store from a validated genesis state.
    pub fn init_genesis(&self, genesis: &GenesisState) -> EngineResult<()> {
        genesis.validate()?;
        for rig in &genesis.mining_rigs {
            self.save(&rig.store_key(), rig)?;
        }
        for operator in &genesis.pool_operators {
            self.save(&operator.store_key(), operator)?;
        }
        for node in &genesis.staking_nodes {
            self.save(&node.store_key(), node)?;
        }
        info!(
            rigs = genesis.mining_rigs.len(),
            operators = genesis.pool_operators.len(),
            nodes = genesis.staking_nodes.len(),
            "Seeded genesis state"
        );
        Ok(())
    }

    /// Module parameters.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Current mining difficulty.
    pub fn difficulty(&self) -> EngineResult<u64> {
        Ok(self.difficulty_state()?.value)
    }

    /// Start-of-block hook: runs the difficulty retarget when `ctx.height`
    /// is an adjustment boundary.
    pub fn on_block_start(&self, ctx: &BlockContext) -> EngineResult<()> {
        self.events.lock().clear();

        if !self.controller.is_retarget_height(ctx.height) {
            return Ok(());
        }

        let state = self.difficulty_state()?;
        let observed_window_ms = match self.retarget_anchor()? {
            Some(anchor) if ctx.timestamp_ms > anchor.timestamp_ms => {
                (ctx.timestamp_ms - anchor.timestamp_ms) as u64
            }
            // No usable history: treat the window as on target.
            _ => 0,
        };

        if let Some((new_state, retarget)) =
            self.controller.retarget(ctx.height, &state, observed_window_ms)
        {
            self.save(&keys::difficulty_state_key(), &new_state)?;
            self.save(
                &keys::retarget_anchor_key(),
                &RetargetAnchor {
                    height: ctx.height,
                    timestamp_ms: ctx.timestamp_ms,
                },
            )?;
            info!(
                old_difficulty = retarget.old_difficulty,
                new_difficulty = retarget.new_difficulty,
                height = retarget.height,
                "Difficulty adjusted"
            );
            self.emit(EngineEvent::DifficultyAdjusted {
                old_difficulty: retarget.old_difficulty,
                new_difficulty: retarget.new_difficulty,
                height: retarget.height,
            });
        }
        Ok(())
    }

    /// Process a mining attempt.
    ///
    /// On success the miner is paid the per-attempt reward and the
    /// resulting batch is queued for the end-of-block settlement flush.
    /// An invalid proof is terminal for the attempt.
    pub fn mine(
        &self,
        ctx: &BlockContext,
        miner: &str,
        proof: &[u8],
    ) -> EngineResult<RewardBatch> {
        let difficulty = self.difficulty()?;
        let batch = self.validator.process(
            ctx,
            difficulty,
            miner,
            proof,
            &self.ledger,
            self.custody.as_ref(),
        )?;
        self.pending_batches.lock().push(batch.clone());
        self.pending_rewards.lock().push(MinedReward {
            miner: miner.to_string(),
            reward: self.ledger.base_reward(ctx.height),
        });
        Ok(batch)
    }

    /// Register a staking node for `operator` with a verified stake.
    pub fn register_node(
        &self,
        ctx: &BlockContext,
        operator: &str,
        moniker: &str,
        supported_chains: Vec<String>,
        verified_stake: Amount,
    ) -> EngineResult<StakingNode> {
        let node = self.registry.register_node(
            self.store.as_ref(),
            operator,
            moniker,
            supported_chains,
            verified_stake,
            ctx.height,
        )?;
        self.emit(EngineEvent::StakingNodeCreated {
            operator: node.operator.clone(),
            moniker: node.moniker.clone(),
            voting_power: node.voting_power,
        });
        Ok(node)
    }

    /// Apply one `(operator, did_sign)` tuple from the consensus
    /// engine's signer feed.
    pub fn update_online_status(
        &self,
        operator: &str,
        did_sign: bool,
        height: i64,
    ) -> EngineResult<()> {
        let transition =
            self.registry
                .update_online_status(self.store.as_ref(), operator, did_sign, height)?;
        match transition {
            Some(StatusTransition::CameOnline) => self.emit(EngineEvent::StakingNodeOnline {
                operator: operator.to_string(),
                height,
            }),
            Some(StatusTransition::WentOffline) => self.emit(EngineEvent::StakingNodeOffline {
                operator: operator.to_string(),
                height,
            }),
            None => {}
        }
        Ok(())
    }

    /// Apply one authenticated inbound cross-chain message.
    ///
    /// Messages from chains outside `params.supported_chains` are
    /// rejected before any handler runs.
    pub fn process_message(
        &self,
        ctx: &BlockContext,
        msg: &CrossChainMessage,
    ) -> EngineResult<()> {
        if !self.params.supports_chain(&msg.source_chain) {
            return Err(
                CrosschainError::UnsupportedChain(msg.source_chain.clone()).into(),
            );
        }
        let block_time = ctx.timestamp_ms / 1000;
        let applied = self
            .processor
            .process(self.store.as_ref(), msg, block_time)?;

        if let Applied::RigUpserted(rig) = &applied {
            self.emit(EngineEvent::MiningRigUpdated {
                token_id: rig.token_id,
                chain_id: rig.chain_id.clone(),
                hash_power: rig.hash_power,
                watt_consumption: rig.watt_consumption,
            });
        }
        self.emit(EngineEvent::CrossChainMessageProcessed {
            source_chain: msg.source_chain.clone(),
            message_type: msg.message_type.clone(),
            nonce: msg.nonce,
        });
        Ok(())
    }

    /// End-of-block hook: distribute rewards, then flush settlement.
    ///
    /// Per-entity failures inside distribution are handled best-effort;
    /// an empty miner set is reported but still lets the staking payout
    /// and settlement flush run, so the block always finalizes.
    pub fn on_block_end(&self, ctx: &BlockContext) -> EngineResult<()> {
        let (total_mining_reward, miners_paid) = match self.ledger.distribute_mining_rewards(
            self.store.as_ref(),
            self.custody.as_ref(),
            ctx.height,
        ) {
            Ok(outcome) => (outcome.total_paid, outcome.miners_paid),
            Err(MiningError::NoActiveMiners) => {
                warn!(height = ctx.height, "No active mining rigs found");
                (0, 0)
            }
            Err(err) => return Err(err.into()),
        };

        let (nodes_paid, deliveries_failed) = send_staking_rewards(
            self.store.as_ref(),
            &self.registry,
            self.transport.as_ref(),
            self.params.staking_reward_per_chain,
            ctx.height,
        )?;
        if deliveries_failed > 0 {
            warn!(
                height = ctx.height,
                deliveries_failed, "Some staking payouts were not delivered"
            );
        }

        self.emit(EngineEvent::RewardsDistributed {
            height: ctx.height,
            total_mining_reward,
            miners_paid,
            nodes_paid,
        });

        self.flush_batches();
        self.send_reward_notices(ctx);
        self.send_sync_notice(ctx);
        Ok(())
    }

    /// Drain the events emitted since the last block start.
    pub fn take_events(&self) -> Vec<EngineEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    /// Sum of hash power over active rigs.
    pub fn total_hash_power(&self) -> EngineResult<u64> {
        Ok(quarry_mining::total_hash_power(self.store.as_ref())?)
    }

    /// Look up a staking node.
    pub fn staking_node(&self, operator: &str) -> EngineResult<Option<StakingNode>> {
        Ok(self.registry.get_node(self.store.as_ref(), operator)?)
    }

    fn flush_batches(&self) {
        let batches = std::mem::take(&mut *self.pending_batches.lock());
        for batch in batches {
            match self.emitter.submit(&batch) {
                Ok(()) => self.emit(EngineEvent::BatchSubmitted {
                    height: batch.height,
                    tx_count: batch.tx_count,
                }),
                // Surfaced and dropped; re-submission is the L1
                // collaborator's concern.
                Err(err) => error!(height = batch.height, %err, "Dropping unsettled batch"),
            }
        }
    }

    fn send_reward_notices(&self, ctx: &BlockContext) {
        // Drained even without a peer, so notices never leak across blocks.
        let rewards = std::mem::take(&mut *self.pending_rewards.lock());
        let Some(peer_chain) = self.params.sync_peer_chain.as_deref() else {
            return;
        };
        for mined in rewards {
            if let Err(err) = send_reward_notice(
                self.transport.as_ref(),
                peer_chain,
                &mined.miner,
                mined.reward,
                ctx.height,
                ctx.timestamp_ms / 1000,
            ) {
                match err {
                    CrosschainError::Delivery { chain_id, source } => {
                        error!(%chain_id, %source, "Failed to deliver reward notice");
                    }
                    other => error!(%other, "Failed to build reward notice"),
                }
            }
        }
    }

    fn send_sync_notice(&self, ctx: &BlockContext) {
        let Some(peer_chain) = self.params.sync_peer_chain.as_deref() else {
            return;
        };
        let difficulty = match self.difficulty() {
            Ok(d) => d,
            Err(err) => {
                error!(%err, "Skipping sync notice, difficulty unavailable");
                return;
            }
        };
        if let Err(err) = send_block_sync(
            self.transport.as_ref(),
            peer_chain,
            ctx.height,
            ctx.timestamp_ms / 1000,
            difficulty,
        ) {
            match err {
                CrosschainError::Delivery { chain_id, source } => {
                    error!(%chain_id, %source, "Failed to deliver sync notice");
                }
                other => error!(%other, "Failed to build sync notice"),
            }
        }
    }

    fn difficulty_state(&self) -> EngineResult<DifficultyState> {
        match self.store.get(&keys::difficulty_state_key())? {
            Some(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| EngineError::Serialization(e.to_string())),
            None => Ok(DifficultyState::default()),
        }
    }

    fn retarget_anchor(&self) -> EngineResult<Option<RetargetAnchor>> {
        match self.store.get(&keys::retarget_anchor_key())? {
            Some(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|e| EngineError::Serialization(e.to_string())),
            None => Ok(None),
        }
    }

    fn emit(&self, event: EngineEvent) {
        self.events.lock().push(event);
    }

    fn save<T: Serialize>(&self, key: &[u8], value: &T) -> EngineResult<()> {
        let bytes =
            serde_json::to_vec(value).map_err(|e| EngineError::Serialization(e.to_string()))?;
        self.store.put(key, &bytes)?;
        Ok(())
    }
}
