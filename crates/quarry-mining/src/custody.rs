//! Token custody capability.

use quarry_types::Amount;
use thiserror::Error;

/// Errors surfaced by the custody collaborator.
#[derive(Error, Debug)]
pub enum CustodyError {
    /// Recipient address could not be resolved.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Mint was rejected.
    #[error("Mint failed: {0}")]
    MintFailed(String),

    /// Transfer was rejected.
    #[error("Transfer failed: {0}")]
    TransferFailed(String),
}

/// Result type for custody operations.
pub type CustodyResult<T> = Result<T, CustodyError>;

/// Mint/transfer capability over the native token supply.
///
/// Implementations must make a mint-then-transfer pair atomic: on
/// failure, no coins minted by the pair may remain visible.
pub trait TokenCustody: Send + Sync {
    /// Mint `amount` of `denom` into a module account.
    fn mint(&self, module_account: &str, denom: &str, amount: Amount) -> CustodyResult<()>;

    /// Transfer `amount` of `denom` from a module account to a user account.
    fn transfer(
        &self,
        from_module: &str,
        to_account: &str,
        denom: &str,
        amount: Amount,
    ) -> CustodyResult<()>;

    /// Whether `address` is a well-formed account the custody layer can
    /// pay. Distribution skips (and logs) recipients that fail this.
    fn is_valid_address(&self, address: &str) -> bool {
        !address.is_empty()
    }
}
