//! Registry error types.

use quarry_types::Amount;
use thiserror::Error;

/// Registry errors.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// A required field was missing or malformed.
    #[error("Invalid registration: {0}")]
    Validation(String),

    /// Verified stake is below the module minimum.
    #[error("Insufficient stake: required {required}, got {got}")]
    InsufficientStake {
        /// Minimum stake in base units.
        required: Amount,
        /// Verified stake in base units.
        got: Amount,
    },

    /// The operator already has a registered node.
    #[error("Node already registered for operator {0}")]
    AlreadyRegistered(String),

    /// No node registered for the operator.
    #[error("Unknown staking node: {0}")]
    UnknownNode(String),

    /// Storage error.
    #[error(transparent)]
    Storage(#[from] quarry_storage::StorageError),

    /// A stored node entry could not be decoded.
    #[error("Corrupt staking node entry: {0}")]
    CorruptEntry(String),
}

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;
