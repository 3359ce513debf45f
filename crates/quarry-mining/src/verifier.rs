//! Proof verification capability.

use quarry_types::BlockContext;

/// Black-box predicate over a mining proof.
///
/// Implementations must be pure and deterministic: identical inputs must
/// verify identically on every validating node. The engine treats the
/// proof system itself as an external collaborator.
pub trait ProofVerifier: Send + Sync {
    /// Verify `proof` against the encoded public inputs and block context.
    fn verify(&self, proof: &[u8], public_inputs: &[u8], ctx: &BlockContext) -> bool;
}
