//! Test harness for integration tests.
//!
//! Provides a RocksDB-backed test database and recording collaborators
//! so whole-engine tests can assert on every external effect.

use parking_lot::Mutex;
use quarry_crosschain::{CrossChainTransport, TransportError, TransportResult};
use quarry_engine::Engine;
use quarry_mining::{CustodyError, CustodyResult, ProofVerifier, TokenCustody};
use quarry_settlement::L1Client;
use quarry_storage::{Database, Storage};
use quarry_types::{Amount, BlockContext, Params, RewardBatch};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

/// Test database wrapper that cleans up on drop.
pub struct TestDatabase {
    db: Database,
    _temp_dir: TempDir,
}

impl TestDatabase {
    /// Create a new test database in a temporary directory.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let db = Database::open(temp_dir.path()).expect("Failed to open database");
        Self {
            db,
            _temp_dir: temp_dir,
        }
    }

    /// Get the path to the database.
    pub fn path(&self) -> PathBuf {
        self._temp_dir.path().to_path_buf()
    }

    /// Get a clone of the database (shares the underlying connection).
    pub fn db_clone(&self) -> Database {
        self.db.clone()
    }
}

impl Default for TestDatabase {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Deref for TestDatabase {
    type Target = Database;

    fn deref(&self) -> &Self::Target {
        &self.db
    }
}

/// Verifier accepting exactly the proofs it was told to accept.
#[derive(Default)]
pub struct ScriptedVerifier {
    accepted: Mutex<Vec<Vec<u8>>>,
}

impl ScriptedVerifier {
    /// Accept every attempt.
    pub fn accept_all() -> Self {
        let v = Self::default();
        v.accepted.lock().push(Vec::new());
        v
    }

    /// Mark one proof as valid.
    pub fn accept(&self, proof: &[u8]) {
        self.accepted.lock().push(proof.to_vec());
    }
}

impl ProofVerifier for ScriptedVerifier {
    fn verify(&self, proof: &[u8], _public_inputs: &[u8], _ctx: &BlockContext) -> bool {
        self.accepted
            .lock()
            .iter()
            .any(|p| p.is_empty() || p == proof)
    }
}

/// Custody double that tracks balances and can be told to fail.
#[derive(Default)]
pub struct RecordingCustody {
    balances: Mutex<HashMap<(String, String), Amount>>,
    /// Addresses the custody layer pretends not to resolve.
    pub invalid_addresses: Mutex<Vec<String>>,
}

impl RecordingCustody {
    /// Balance of an account in a denom.
    pub fn balance(&self, account: &str, denom: &str) -> Amount {
        self.balances
            .lock()
            .get(&(account.to_string(), denom.to_string()))
            .copied()
            .unwrap_or(0)
    }
}

impl TokenCustody for RecordingCustody {
    fn mint(&self, account: &str, denom: &str, amount: Amount) -> CustodyResult<()> {
        *self
            .balances
            .lock()
            .entry((account.to_string(), denom.to_string()))
            .or_insert(0) += amount;
        Ok(())
    }

    fn transfer(&self, from: &str, to: &str, denom: &str, amount: Amount) -> CustodyResult<()> {
        if self.invalid_addresses.lock().iter().any(|a| a == to) {
            return Err(CustodyError::InvalidAddress(to.to_string()));
        }
        let mut balances = self.balances.lock();
        let from_key = (from.to_string(), denom.to_string());
        let available = balances.get(&from_key).copied().unwrap_or(0);
        if available < amount {
            return Err(CustodyError::TransferFailed(format!(
                "insufficient balance: {available} < {amount}"
            )));
        }
        balances.insert(from_key, available - amount);
        *balances
            .entry((to.to_string(), denom.to_string()))
            .or_insert(0) += amount;
        Ok(())
    }
}

/// L1 client that records submitted batches.
#[derive(Default)]
pub struct RecordingL1 {
    /// Batches received, in submission order.
    pub batches: Mutex<Vec<RewardBatch>>,
    /// When set, every submission is rejected.
    pub fail: Mutex<bool>,
}

impl L1Client for RecordingL1 {
    fn submit_batch(&self, batch: &RewardBatch) -> Result<(), String> {
        if *self.fail.lock() {
            return Err("L1 unavailable".into());
        }
        self.batches.lock().push(batch.clone());
        Ok(())
    }
}

/// Transport that records outbound payloads per destination chain.
#[derive(Default)]
pub struct RecordingTransport {
    /// `(chain_id, payload)` pairs in send order.
    pub sent: Mutex<Vec<(String, Vec<u8>)>>,
    /// Chains whose deliveries fail.
    pub failing_chains: Mutex<Vec<String>>,
}

impl RecordingTransport {
    /// Payloads sent to one chain.
    pub fn sent_to(&self, chain_id: &str) -> Vec<Vec<u8>> {
        self.sent
            .lock()
            .iter()
            .filter(|(c, _)| c == chain_id)
            .map(|(_, p)| p.clone())
            .collect()
    }
}

impl CrossChainTransport for RecordingTransport {
    fn send(&self, chain_id: &str, payload: &[u8]) -> TransportResult<()> {
        if self.failing_chains.lock().iter().any(|c| c == chain_id) {
            return Err(TransportError(format!("{chain_id} unreachable")));
        }
        self.sent.lock().push((chain_id.to_string(), payload.to_vec()));
        Ok(())
    }
}

/// A fully-wired engine plus handles to all its collaborators.
pub struct TestEngine {
    /// The engine under test.
    pub engine: Engine,
    /// Shared store handle for direct inspection.
    pub store: Database,
    /// Scripted proof verifier.
    pub verifier: Arc<ScriptedVerifier>,
    /// Recording custody ledger.
    pub custody: Arc<RecordingCustody>,
    /// Recording L1 client.
    pub l1: Arc<RecordingL1>,
    /// Recording transport.
    pub transport: Arc<RecordingTransport>,
    _db: TestDatabase,
}

impl TestEngine {
    /// Build an engine over a fresh database with default parameters.
    pub fn new() -> Self {
        Self::with_params(Params::default())
    }

    /// Build an engine whose verifier rejects every proof.
    pub fn rejecting() -> Self {
        Self::build(Params::default(), ScriptedVerifier::default())
    }

    /// Build an engine over a fresh database with custom parameters.
    pub fn with_params(params: Params) -> Self {
        Self::build(params, ScriptedVerifier::accept_all())
    }

    fn build(params: Params, verifier: ScriptedVerifier) -> Self {
        let db = TestDatabase::new();
        let store = db.db_clone();
        let verifier = Arc::new(verifier);
        let custody = Arc::new(RecordingCustody::default());
        let l1 = Arc::new(RecordingL1::default());
        let transport = Arc::new(RecordingTransport::default());

        let engine = Engine::new(
            Arc::new(db.db_clone()) as Arc<dyn Storage>,
            params,
            Arc::clone(&verifier) as Arc<dyn ProofVerifier>,
            Arc::clone(&custody) as Arc<dyn TokenCustody>,
            Arc::clone(&l1) as Arc<dyn L1Client>,
            Arc::clone(&transport) as Arc<dyn CrossChainTransport>,
        )
        .expect("Failed to build engine");

        Self {
            engine,
            store,
            verifier,
            custody,
            l1,
            transport,
            _db: db,
        }
    }
}

impl Default for TestEngine {
    fn default() -> Self {
        Self::new()
    }
}
