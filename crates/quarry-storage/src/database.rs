//! RocksDB database implementation.

use crate::batch::OperationKind;
use crate::{Storage, StorageError, StorageResult, WriteBatch};
use rocksdb::{DBWithThreadMode, IteratorMode, MultiThreaded, Options};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// RocksDB database wrapper.
///
/// A single keyspace; entity types are separated by string key prefixes
/// rather than column families so that prefix range scans map directly
/// onto RocksDB's ordered iteration.
#[derive(Clone)]
pub struct Database {
    db: Arc<DBWithThreadMode<MultiThreaded>>,
}

impl Database {
    /// Open or create a database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> StorageResult<Self> {
        let path = path.as_ref();
        info!("Opening database at {:?}", path);

        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.set_max_open_files(256);
        opts.set_keep_log_file_num(1);
        opts.set_max_total_wal_size(64 * 1024 * 1024); // 64MB
        opts.set_compression_type(rocksdb::DBCompressionType::Lz4);

        let db = DBWithThreadMode::<MultiThreaded>::open(&opts, path)?;
        debug!("Database opened successfully");

        Ok(Self { db: Arc::new(db) })
    }

    /// Flush all pending writes to disk.
    pub fn flush(&self) -> StorageResult<()> {
        self.db.flush()?;
        Ok(())
    }
}

impl Storage for Database {
    fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>> {
        Ok(self.db.get(key)?)
    }

    fn put(&self, key: &[u8], value: &[u8]) -> StorageResult<()> {
        self.db.put(key, value)?;
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> StorageResult<()> {
        self.db.delete(key)?;
        Ok(())
    }

    fn write_batch(&self, batch: WriteBatch) -> StorageResult<()> {
        let mut rocks_batch = rocksdb::WriteBatch::default();
        for op in batch.operations {
            match op.kind {
                OperationKind::Put { value } => rocks_batch.put(&op.key, &value),
                OperationKind::Delete => rocks_batch.delete(&op.key),
            }
        }
        self.db.write(rocks_batch)?;
        Ok(())
    }

    fn scan_prefix(&self, prefix: &[u8]) -> StorageResult<Vec<(Vec<u8>, Vec<u8>)>> {
        let mode = IteratorMode::From(prefix, rocksdb::Direction::Forward);
        let mut entries = Vec::new();
        for item in self.db.iterator(mode) {
            let (key, value) = item?;
            if !key.starts_with(prefix) {
                break;
            }
            entries.push((key.to_vec(), value.to_vec()));
        }
        Ok(entries)
    }
}
