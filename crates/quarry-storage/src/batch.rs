//! Write batch for atomic operations.

/// Kind of batch operation.
#[derive(Debug, Clone)]
pub enum OperationKind {
    /// Put a key-value pair.
    Put {
        /// Value to store.
        value: Vec<u8>,
    },
    /// Delete a key.
    Delete,
}

/// A single batch operation.
#[derive(Debug, Clone)]
pub struct BatchOperation {
    /// Key to operate on.
    pub key: Vec<u8>,
    /// Kind of operation.
    pub kind: OperationKind,
}

/// A batch of write operations to be executed atomically.
#[derive(Debug, Default)]
pub struct WriteBatch {
    /// Collected operations, applied in insertion order.
    pub(crate) operations: Vec<BatchOperation>,
}

impl WriteBatch {
    /// Create a new empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a batch with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            operations: Vec::with_capacity(capacity),
        }
    }

    /// Add a put operation to the batch.
    pub fn put(&mut self, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) {
        self.operations.push(BatchOperation {
            key: key.into(),
            kind: OperationKind::Put {
                value: value.into(),
            },
        });
    }

    /// Add a delete operation to the batch.
    pub fn delete(&mut self, key: impl Into<Vec<u8>>) {
        self.operations.push(BatchOperation {
            key: key.into(),
            kind: OperationKind::Delete,
        });
    }

    /// Number of operations in the batch.
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Whether the batch is empty.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_collects_operations_in_order() {
        let mut batch = WriteBatch::new();
        batch.put(b"a".to_vec(), b"1".to_vec());
        batch.delete(b"b".to_vec());
        assert_eq!(batch.len(), 2);
        assert!(matches!(batch.operations[0].kind, OperationKind::Put { .. }));
        assert!(matches!(batch.operations[1].kind, OperationKind::Delete));
    }
}
