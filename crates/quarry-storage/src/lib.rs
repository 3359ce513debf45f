//! # quarry-storage
//!
//! Storage layer for the quarry settlement engine.
//!
//! The engine persists every entity into one authoritative key-value
//! store. Keys carry a type prefix (`mining_rig/`, `staking_node/`, ...)
//! so a prefix range scan yields exactly one entity type; the
//! end-of-block reward pass is such a scan. This crate provides:
//! - The [`Storage`] trait abstracting the store
//! - A RocksDB-backed [`Database`] for nodes
//! - A deterministic in-memory [`MemoryStore`] for tests
//! - Atomic [`WriteBatch`] writes

mod batch;
mod database;
mod error;
mod memory;

pub use batch::{BatchOperation, OperationKind, WriteBatch};
pub use database::Database;
pub use error::{StorageError, StorageResult};
pub use memory::MemoryStore;

/// Storage trait for abstracting database operations.
///
/// Implementations must return prefix scans in ascending key order;
/// distribution logic relies on that order being identical on every node.
pub trait Storage: Send + Sync {
    /// Get a value by key.
    fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>>;

    /// Put a key-value pair.
    fn put(&self, key: &[u8], value: &[u8]) -> StorageResult<()>;

    /// Delete a key.
    fn delete(&self, key: &[u8]) -> StorageResult<()>;

    /// Check if a key exists.
    fn contains(&self, key: &[u8]) -> StorageResult<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// Execute a batch of writes atomically.
    fn write_batch(&self, batch: WriteBatch) -> StorageResult<()>;

    /// Collect all entries whose key starts with `prefix`, in ascending
    /// key order.
    fn scan_prefix(&self, prefix: &[u8]) -> StorageResult<Vec<(Vec<u8>, Vec<u8>)>>;
}
