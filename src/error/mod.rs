//! Error handling for the blockchain
//!
//! This module provides the error types for ledger, wallet and mining operations.

use std::fmt;

/// Result type alias for blockchain operations
pub type Result<T> = std::result::Result<T, BlockchainError>;

/// Error types for blockchain operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockchainError {
    /// A block was rejected because it does not extend the current tail
    ChainIntegrity(String),
    /// Key generation or entropy source failures
    Crypto(String),
    /// The system clock could not produce a timestamp
    Clock(String),
    /// Invalid configuration values
    Config(String),
    /// Mining worker failures
    Mining(String),
}

impl BlockchainError {
    /// True for the append race a miner recovers from by retrying
    pub fn is_chain_integrity(&self) -> bool {
        matches!(self, BlockchainError::ChainIntegrity(_))
    }
}

impl fmt::Display for BlockchainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockchainError::ChainIntegrity(msg) => write!(f, "Chain integrity error: {msg}"),
            BlockchainError::Crypto(msg) => write!(f, "Cryptographic error: {msg}"),
            BlockchainError::Clock(msg) => write!(f, "Clock error: {msg}"),
            BlockchainError::Config(msg) => write!(f, "Configuration error: {msg}"),
            BlockchainError::Mining(msg) => write!(f, "Mining error: {msg}"),
        }
    }
}

impl std::error::Error for BlockchainError {}
