//! Inbound message envelope.

use crate::{CrosschainError, CrosschainResult};
use serde::{Deserialize, Serialize};

/// An authenticated message delivered from a foreign chain.
///
/// The transport collaborator has already verified relay signatures;
/// the engine only validates shape and applies semantics. Messages are
/// ephemeral: nothing beyond what a handler writes into entity state is
/// persisted, except the `(source_chain, nonce)` dedup marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossChainMessage {
    /// Chain the message originates from.
    pub source_chain: String,
    /// Wire tag selecting the handler.
    pub message_type: String,
    /// Type-specific JSON payload.
    pub payload: Vec<u8>,
    /// Authenticated sender on the source chain.
    pub sender: String,
    /// Per-source-chain replay counter, the dedup key.
    pub nonce: u64,
    /// Source-chain timestamp, seconds.
    pub timestamp: i64,
}

impl CrossChainMessage {
    /// Validate the envelope before dispatch.
    pub fn validate(&self) -> CrosschainResult<()> {
        if self.source_chain.is_empty() {
            return Err(CrosschainError::Validation(
                "source chain cannot be empty".into(),
            ));
        }
        if self.message_type.is_empty() {
            return Err(CrosschainError::Validation(
                "message type cannot be empty".into(),
            ));
        }
        if self.sender.is_empty() {
            return Err(CrosschainError::Validation("sender cannot be empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message() -> CrossChainMessage {
        CrossChainMessage {
            source_chain: "polygon-137".into(),
            message_type: "mining_rig_update".into(),
            payload: b"{}".to_vec(),
            sender: "0xsender".into(),
            nonce: 1,
            timestamp: 1_700_000_000,
        }
    }

    #[test]
    fn valid_envelope_passes() {
        message().validate().unwrap();
    }

    #[test]
    fn empty_fields_rejected() {
        for field in ["source_chain", "message_type", "sender"] {
            let mut msg = message();
            match field {
                "source_chain" => msg.source_chain.clear(),
                "message_type" => msg.message_type.clear(),
                _ => msg.sender.clear(),
            }
            assert!(msg.validate().is_err(), "{field} should be required");
        }
    }
}
