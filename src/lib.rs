//! # Miner Chain - a small proof-of-work ledger
//!
//! This is a minimal, in-memory blockchain built to show the moving parts of
//! proof-of-work mining. When I come back to this code, here's what I need to
//! remember:
//!
//! ## What I Built
//! - **Ledger**: append-only, hash-linked chain that starts at a fixed genesis
//! - **Proof-of-Work**: a block's SHA-256 hex digest must start with
//!   `difficulty` zeros, found by brute-force nonce search
//! - **Miner**: background thread paying a coinbase reward to one address,
//!   with start/stop and progress reports
//! - **Wallets**: ECDSA P-256 key pairs, address = SHA-256 of the public key hex
//! - **Balances**: never stored, replayed from every transaction on demand
//!
//! ## How I Organized My Code
//! - `core/`: transactions, blocks, proof-of-work, the blockchain ledger
//! - `miner/`: the mining engine
//! - `wallet/`: wallets and the wallet registry
//! - `state/`: copy-on-write snapshots pushed to subscribers
//! - `engine/`: one place that owns the ledger, registry and miner
//! - `config/`: mining settings
//! - `utils/`: hashing, key generation, timestamps
//! - `cli/`: command-line parsing for `main.rs`
//!
//! ## Key Design Decisions I Made
//! - No global state: one `Engine` is built at startup and handed around
//! - Readers always get whole snapshots, never a half-appended block
//! - Appends are serialized; a miner that loses the tail just retries
//! - A `Block` with bad proof-of-work can't be constructed (it panics)

pub mod cli;
pub mod config;
pub mod core;
pub mod engine;
pub mod error;
pub mod miner;
pub mod state;
pub mod utils;
pub mod wallet;

#[cfg(test)]
pub mod testnet;

// Re-export commonly used types for convenience
pub use cli::{Command, Opt};
pub use config::MinerConfig;
pub use core::{
    Block, BlockBuilder, Blockchain, Chain, ChainSnapshot, ProofOfWork, Transaction, COINBASE,
    GENESIS_PREVIOUS_HASH,
};
pub use engine::Engine;
pub use error::{BlockchainError, Result};
pub use miner::{mine_next_block, Miner, MiningProgress};
pub use state::{Published, Subscription};
pub use utils::{current_timestamp, new_key_pair, sha256_digest, sha256_hex};
pub use wallet::{derive_address, Wallet, Wallets};
