//! # quarry-mining
//!
//! Mining-side logic for the quarry settlement engine.
//!
//! This crate provides:
//! - Public-input encoding for proof verification
//! - The mining attempt validator (verify, issue, package for settlement)
//! - The reward ledger: halving schedule, per-attempt issuance, and the
//!   end-of-block hash-power-proportional distribution
//! - The [`ProofVerifier`] and [`TokenCustody`] capability traits

mod attempt;
mod custody;
mod emission;
mod error;
mod public_inputs;
mod verifier;

pub use attempt::AttemptValidator;
pub use custody::{CustodyError, CustodyResult, TokenCustody};
pub use emission::{active_rigs, total_hash_power, DistributionOutcome, RewardLedger};
pub use error::{MiningError, MiningResult};
pub use public_inputs::encode_public_inputs;
pub use verifier::ProofVerifier;
