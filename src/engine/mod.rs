//! Application façade
//!
//! The `Engine` owns the single ledger, wallet registry and miner of a
//! process and exposes the commands, queries and subscriptions that a
//! presentation layer drives.

#[allow(clippy::module_inception)]
pub mod engine;

pub use engine::Engine;
