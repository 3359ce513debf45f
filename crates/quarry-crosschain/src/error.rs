//! Cross-chain error types.

use thiserror::Error;

/// Cross-chain processing errors.
#[derive(Error, Debug)]
pub enum CrosschainError {
    /// A required message field was missing or malformed.
    #[error("Invalid message: {0}")]
    Validation(String),

    /// Payload bytes did not match the shape for the message type.
    #[error("Malformed payload for {message_type}: {reason}")]
    MalformedPayload {
        /// Wire tag of the message.
        message_type: String,
        /// Decode failure detail.
        reason: String,
    },

    /// No handler for the message type; the message is dropped.
    #[error("Unknown message type: {0}")]
    UnknownMessageType(String),

    /// The source chain is not in the configured supported set.
    #[error("Unsupported source chain: {0}")]
    UnsupportedChain(String),

    /// The `(source_chain, nonce)` pair was already applied.
    #[error("Duplicate message from {source_chain} with nonce {nonce}")]
    DuplicateMessage {
        /// Chain the message claims to come from.
        source_chain: String,
        /// Replayed nonce.
        nonce: u64,
    },

    /// Outbound delivery failed; local state is not rolled back.
    #[error("Delivery to {chain_id} failed: {source}")]
    Delivery {
        /// Destination chain.
        chain_id: String,
        /// Transport failure.
        source: crate::TransportError,
    },

    /// Storage error.
    #[error(transparent)]
    Storage(#[from] quarry_storage::StorageError),

    /// Registry error while scanning payout recipients.
    #[error(transparent)]
    Registry(#[from] quarry_registry::RegistryError),

    /// A stored entry could not be re-encoded.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type for cross-chain operations.
pub type CrosschainResult<T> = Result<T, CrosschainError>;
