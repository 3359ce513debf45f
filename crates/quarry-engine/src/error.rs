//! Engine error types.

use thiserror::Error;

/// Engine errors.
///
/// Sub-crate errors keep their own taxonomy; this enum only aggregates
/// them at the orchestration boundary.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Configuration rejected at startup.
    #[error(transparent)]
    Config(#[from] quarry_types::ParamsError),

    /// Mining attempt or distribution failure.
    #[error(transparent)]
    Mining(#[from] quarry_mining::MiningError),

    /// Registry failure.
    #[error(transparent)]
    Registry(#[from] quarry_registry::RegistryError),

    /// Cross-chain processing failure.
    #[error(transparent)]
    Crosschain(#[from] quarry_crosschain::CrosschainError),

    /// Settlement failure.
    #[error(transparent)]
    Settlement(#[from] quarry_settlement::SettlementError),

    /// Storage failure.
    #[error(transparent)]
    Storage(#[from] quarry_storage::StorageError),

    /// A persisted engine record could not be (de)serialized.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
