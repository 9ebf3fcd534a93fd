//! Core blockchain functionality
//!
//! This module contains the fundamental blockchain components: transactions,
//! blocks and their builders, proof-of-work, and the append-only ledger.

pub mod block;
pub mod blockchain;
pub mod proof_of_work;
pub mod transaction;

pub use block::{Block, BlockBuilder, GENESIS_PREVIOUS_HASH, GENESIS_TIMESTAMP};
pub use blockchain::{balance_in, verify_chain, Blockchain, Chain, ChainSnapshot};
pub use proof_of_work::ProofOfWork;
pub use transaction::{Transaction, COINBASE};
