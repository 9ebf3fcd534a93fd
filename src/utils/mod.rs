//! Utility functions and helpers
//!
//! This module contains the hashing and key-pair utilities plus the
//! timestamp helper used throughout the blockchain.

pub mod crypto;

pub use crypto::{current_timestamp, new_key_pair, sha256_digest, sha256_hex, HASH_HEX_LEN};
