//! # quarry-registry
//!
//! Staking/validator node registry for the quarry settlement engine.
//!
//! Nodes register once with a verified minimum stake; after that the
//! only consensus-driven mutation is the per-block online-status feed.
//! Nodes are never deleted — a node that stops signing goes stale with
//! `is_online = false`.

mod error;
mod registry;

pub use error::{RegistryError, RegistryResult};
pub use registry::{voting_power, NodeRegistry, StatusTransition};
