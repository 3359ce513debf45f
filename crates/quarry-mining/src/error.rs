//! Mining error types.

use thiserror::Error;

/// Mining errors.
#[derive(Error, Debug)]
pub enum MiningError {
    /// Proof failed verification; terminal for the attempt.
    #[error("Invalid proof")]
    InvalidProof,

    /// No active rig contributes hash power, distribution cannot run.
    #[error("No active mining rigs found")]
    NoActiveMiners,

    /// Token custody collaborator failed.
    #[error("Custody error: {0}")]
    Custody(#[from] crate::CustodyError),

    /// Storage error.
    #[error(transparent)]
    Storage(#[from] quarry_storage::StorageError),

    /// A stored rig entry could not be decoded.
    #[error("Corrupt mining rig entry: {0}")]
    CorruptEntry(String),
}

/// Result type for mining operations.
pub type MiningResult<T> = Result<T, MiningError>;
