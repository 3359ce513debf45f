//! # quarry-tests
//!
//! Integration tests for the quarry settlement engine.
//!
//! This crate provides:
//! - A test harness wiring the engine to recording collaborators
//! - Generators for rigs, nodes, and cross-chain messages
//! - Full block-lifecycle integration tests
//! - Property-based tests for the reward and difficulty math

pub mod generators;
pub mod harness;


#[cfg(test)]
mod engine_tests;

#[cfg(test)]
mod mining_tests;


#[cfg(test)]
mod storage_tests;

pub use generators::*;
pub use harness::*;
