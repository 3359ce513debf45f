//! Cross-chain transport capability.

use thiserror::Error;

/// Transport failure as reported by the messaging collaborator.
#[derive(Error, Debug)]
#[error("Transport error: {0}")]
pub struct TransportError(pub String);

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Outbound side of the cross-chain messaging layer.
///
/// Authentication, relaying, and retry all belong to the implementation;
/// the engine fires payloads and logs failures.
pub trait CrossChainTransport: Send + Sync {
    /// Send an opaque payload to a destination chain.
    fn send(&self, destination_chain_id: &str, payload: &[u8]) -> TransportResult<()>;
}
