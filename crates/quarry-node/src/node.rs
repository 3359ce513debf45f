//! Node implementation.
//!
//! Drives the engine through the block lifecycle on a fixed timer. In
//! this local setup the node is its own consensus engine: it fabricates
//! block contexts by hash-chaining heights, runs the start/end hooks,
//! and optionally submits mining attempts for the configured address.

use crate::collaborators::{
    HashThresholdVerifier, LocalCustody, LoggingL1Client, LoggingTransport,
};
use crate::config::NodeConfig;
use anyhow::{Context, Result};
use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use quarry_engine::{Engine, EngineError};
use quarry_mining::MiningError;
use quarry_storage::{Database, Storage};
use quarry_types::{BlockContext, GenesisState};
use rand::RngCore;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

type Blake2b256 = Blake2b<U32>;

/// Marker key noting that genesis has been applied to this store.
const GENESIS_APPLIED_KEY: &[u8] = b"node/genesis_applied";
/// Key holding the last produced height.
const LAST_HEIGHT_KEY: &[u8] = b"node/last_height";

/// The main node struct coordinating the engine and its collaborators.
pub struct Node {
    config: NodeConfig,
    store: Arc<Database>,
    engine: Engine,
    custody: Arc<LocalCustody>,
    shutdown: AtomicBool,
}

impl Node {
    /// Create a new node: open storage, wire collaborators, seed genesis.
    pub fn new(config: NodeConfig) -> Result<Arc<Self>> {
        std::fs::create_dir_all(&config.data_dir)?;

        let db_path = config.data_dir.join("db");
        info!("Opening database at {:?}", db_path);
        let store = Arc::new(Database::open(&db_path)?);

        let custody = Arc::new(LocalCustody::default());
        let engine = Engine::new(
            Arc::clone(&store) as Arc<dyn Storage>,
            config.params.clone(),
            Arc::new(HashThresholdVerifier::new(config.mining.proof_threshold)),
            Arc::clone(&custody) as Arc<dyn quarry_mining::TokenCustody>,
            Arc::new(LoggingL1Client),
            Arc::new(LoggingTransport),
        )?;

        let node = Arc::new(Self {
            config,
            store,
            engine,
            custody,
            shutdown: AtomicBool::new(false),
        });
        node.apply_genesis()?;
        Ok(node)
    }

    /// Produce blocks until shutdown.
    pub async fn run(self: &Arc<Self>) -> Result<()> {
        let interval = Duration::from_millis(self.config.block_interval_ms);
        let mut height = self.last_height()?;
        let mut prev_hash = [0u8; 32];
        let mut rng = rand::thread_rng();

        info!(resume_height = height, "Producing blocks");

        while !self.shutdown.load(Ordering::Relaxed) {
            height += 1;
            let ctx = self.next_context(height, prev_hash);
            prev_hash = ctx.block_hash;

            self.engine.on_block_start(&ctx)?;

            if self.config.mining.enabled {
                self.attempt_mine(&ctx, &mut rng);
            }

            self.engine.on_block_end(&ctx)?;
            self.persist_height(height)?;

            let events = self.engine.take_events();
            if !events.is_empty() {
                debug!(height, events = events.len(), "Block events");
            }

            tokio::time::sleep(interval).await;
        }
        Ok(())
    }

    /// Request shutdown; the run loop exits after the current block.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Balance of the reward address, for log inspection.
    pub fn reward_balance(&self) -> quarry_types::Amount {
        match self.config.mining.reward_address {
            Some(ref addr) => self.custody.balance(addr, quarry_types::NATIVE_DENOM),
            None => 0,
        }
    }

    fn attempt_mine(&self, ctx: &BlockContext, rng: &mut impl RngCore) {
        let Some(miner) = self.config.mining.reward_address.as_deref() else {
            return;
        };
        let mut proof = [0u8; 32];
        rng.fill_bytes(&mut proof);

        match self.engine.mine(ctx, miner, &proof) {
            Ok(batch) => {
                info!(height = ctx.height, tx_count = batch.tx_count, "Mined block");
            }
            Err(EngineError::Mining(MiningError::InvalidProof)) => {
                debug!(height = ctx.height, "Mining attempt missed");
            }
            Err(err) => warn!(height = ctx.height, %err, "Mining attempt failed"),
        }
    }

    fn next_context(&self, height: i64, prev_hash: [u8; 32]) -> BlockContext {
        let mut hasher = Blake2b256::new();
        hasher.update(height.to_be_bytes());
        hasher.update(prev_hash);
        let digest = hasher.finalize();
        let mut block_hash = [0u8; 32];
        block_hash.copy_from_slice(&digest);

        BlockContext {
            height,
            timestamp_ms: height * self.config.block_interval_ms as i64,
            block_hash,
            prev_block_hash: prev_hash,
            tx_count: 0,
        }
    }

    fn apply_genesis(&self) -> Result<()> {
        if self.store.contains(GENESIS_APPLIED_KEY)? {
            return Ok(());
        }
        let Some(ref path) = self.config.genesis_file else {
            return Ok(());
        };
        let content = std::fs::read_to_string(path).context("Failed to read genesis file")?;
        let genesis: GenesisState =
            serde_json::from_str(&content).context("Failed to parse genesis file")?;
        self.engine.init_genesis(&genesis)?;
        // Exported states carry the height they were taken at; resume
        // block production from there instead of height zero.
        if genesis.last_block_height > 0 {
            self.persist_height(genesis.last_block_height)?;
        }
        self.store.put(GENESIS_APPLIED_KEY, b"1")?;
        Ok(())
    }

    fn last_height(&self) -> Result<i64> {
        match self.store.get(LAST_HEIGHT_KEY)? {
            Some(bytes) => {
                let arr: [u8; 8] = bytes
                    .as_slice()
                    .try_into()
                    .context("Corrupt last-height record")?;
                Ok(i64::from_be_bytes(arr))
            }
            None => Ok(0),
        }
    }

    fn persist_height(&self, height: i64) -> Result<()> {
        self.store.put(LAST_HEIGHT_KEY, &height.to_be_bytes())?;
        Ok(())
    }
}
