//! Configuration management
//!
//! This module holds the mining settings. There is no global config: the
//! application builds one `MinerConfig` and passes it to the miner.

pub mod settings;

pub use settings::MinerConfig;
