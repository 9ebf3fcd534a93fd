//! Testing helpers
//!
//! Shared block builders and waiting helpers for the unit tests of the
//! ledger, the miner and the engine.

pub mod test_utils;

pub use test_utils::*;
