//! # quarry-engine
//!
//! Block-lifecycle orchestration for the quarry settlement engine.
//!
//! One [`Engine`] owns the authoritative store and drives every state
//! transition in deterministic order: difficulty retarget at block
//! start, mining attempts during the block, reward distribution and
//! settlement flush at block end. Cross-chain messages are applied as
//! ordinary transitions whenever the transport delivers them.
//!
//! All external effects go through constructor-injected capability
//! traits (`ProofVerifier`, `TokenCustody`, `L1Client`,
//! `CrossChainTransport`), so the whole engine runs against test
//! doubles.

mod engine;
mod error;

pub use engine::Engine;
pub use error::{EngineError, EngineResult};
