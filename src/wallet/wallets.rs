use crate::error::Result;
use crate::state::{Published, Subscription};
use crate::wallet::Wallet;
use log::info;
use std::sync::Arc;

/// An immutable view of the registry, in creation order
pub type WalletsSnapshot = Arc<Vec<Wallet>>;

/// In-memory registry of created wallets. Clones share the same registry.
#[derive(Clone)]
pub struct Wallets {
    wallets: Published<Vec<Wallet>>,
}

impl Default for Wallets {
    fn default() -> Self {
        Self::new()
    }
}

impl Wallets {
    pub fn new() -> Wallets {
        Wallets {
            wallets: Published::new(Vec::new()),
        }
    }

    /// Generate a key pair, register the wallet and publish the new list
    pub fn create_wallet(&self) -> Result<Wallet> {
        // Key generation stays outside the writer lock
        let wallet = Wallet::new()?;
        let created = wallet.clone();
        self.wallets.update(move |wallets| {
            let mut next = Vec::with_capacity(wallets.len() + 1);
            next.extend_from_slice(wallets);
            next.push(created);
            Ok(next)
        })?;
        info!("Created wallet {}", wallet.get_address());
        Ok(wallet)
    }

    pub fn list(&self) -> WalletsSnapshot {
        self.wallets.get()
    }

    pub fn get_addresses(&self) -> Vec<String> {
        self.wallets
            .get()
            .iter()
            .map(|wallet| wallet.get_address().to_string())
            .collect()
    }

    pub fn get_wallet(&self, address: &str) -> Option<Wallet> {
        self.wallets
            .get()
            .iter()
            .find(|wallet| wallet.get_address() == address)
            .cloned()
    }

    pub fn subscribe(&self) -> Subscription<Vec<Wallet>> {
        self.wallets.subscribe()
    }

    pub fn len(&self) -> usize {
        self.wallets.get().len()
    }

    pub fn is_empty(&self) -> bool {
        self.wallets.get().is_empty()
    }
}
