//! Wallet management
//!
//! This module handles wallet creation (key pair + derived address) and the
//! in-memory registry of wallets.

#[allow(clippy::module_inception)]
pub mod wallet;
pub mod wallets;

pub use wallet::{derive_address, Wallet};
pub use wallets::{Wallets, WalletsSnapshot};
