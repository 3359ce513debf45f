//! Parameter and genesis validation errors.

use thiserror::Error;

/// Errors from parameter or genesis validation.
///
/// These are configuration errors: they surface at startup and never
/// during block processing.
#[derive(Error, Debug)]
pub enum ParamsError {
    /// Difficulty bounds are empty or inverted.
    #[error("Invalid difficulty bounds: min {min} must be positive and <= max {max}")]
    InvalidDifficultyBounds {
        /// Configured minimum.
        min: u64,
        /// Configured maximum.
        max: u64,
    },

    /// Halving interval must be positive.
    #[error("Halving interval must be positive: {0}")]
    NonPositiveHalvingInterval(i64),

    /// Minimum stake must be positive.
    #[error("Minimum stake amount cannot be zero")]
    ZeroMinStake,

    /// At least one supported chain is required.
    #[error("Supported chains cannot be empty")]
    NoSupportedChains,

    /// A genesis entity failed validation.
    #[error("Invalid genesis state: {0}")]
    InvalidGenesis(String),
}

/// Result type for parameter validation.
pub type ParamsResult<T> = Result<T, ParamsError>;
