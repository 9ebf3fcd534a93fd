//! Mining engine
//!
//! This module runs the nonce search in a background thread, commits mined
//! blocks to the ledger and reports the candidate being worked on.

#[allow(clippy::module_inception)]
pub mod miner;

pub use miner::{mine_next_block, Miner, MiningProgress, ProgressSnapshot};
