//! Snapshot publication
//!
//! Shared state (the ledger, the wallet registry, mining progress) is held
//! behind copy-on-write snapshots. Subscribers are handed the newest one.

pub mod published;

pub use published::{Published, Subscription};
