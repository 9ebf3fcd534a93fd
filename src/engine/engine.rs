use crate::config::MinerConfig;
use crate::core::{Blockchain, Chain};
use crate::error::Result;
use crate::miner::{Miner, MiningProgress};
use crate::state::Subscription;
use crate::wallet::{Wallet, Wallets};
use std::sync::Arc;

/// One ledger, one wallet registry and one miner, wired together.
///
/// Cloning an `Engine` hands out another reference to the same collaborators.
#[derive(Clone)]
pub struct Engine {
    blockchain: Blockchain,
    wallets: Wallets,
    miner: Arc<Miner>,
}

impl Engine {
    pub fn new(config: MinerConfig) -> Engine {
        Self::with_parts(Blockchain::new(), Wallets::new(), config)
    }

    /// Build around an existing ledger and registry
    pub fn with_parts(blockchain: Blockchain, wallets: Wallets, config: MinerConfig) -> Engine {
        let miner = Arc::new(Miner::new(blockchain.clone(), config));
        Engine {
            blockchain,
            wallets,
            miner,
        }
    }

    pub fn start_mining(&self, beneficiary: &str) -> Result<()> {
        self.miner.start(beneficiary)
    }

    pub fn stop_mining(&self) {
        self.miner.stop()
    }

    pub fn is_mining(&self) -> bool {
        self.miner.is_mining()
    }

    pub fn create_wallet(&self) -> Result<Wallet> {
        self.wallets.create_wallet()
    }

    pub fn balance_of(&self, address: &str) -> i64 {
        self.blockchain.balance_of(address)
    }

    pub fn subscribe_chain(&self) -> Subscription<Chain> {
        self.blockchain.subscribe()
    }

    pub fn subscribe_wallets(&self) -> Subscription<Vec<Wallet>> {
        self.wallets.subscribe()
    }

    pub fn subscribe_progress(&self) -> Subscription<Option<MiningProgress>> {
        self.miner.subscribe_progress()
    }

    pub fn get_blockchain(&self) -> &Blockchain {
        &self.blockchain
    }

    pub fn get_wallets(&self) -> &Wallets {
        &self.wallets
    }

    pub fn get_miner(&self) -> &Miner {
        &self.miner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testnet::{test_config, wait_for};
    use std::time::Duration;

    #[test]
    fn test_mine_to_wallet_and_query_balance() {
        let engine = Engine::new(test_config());
        let chain_rx = engine.subscribe_chain();
        let wallet = engine.create_wallet().unwrap();

        engine.start_mining(wallet.get_address()).unwrap();
        assert!(engine.is_mining());
        wait_for(&chain_rx, Duration::from_secs(10), |chain| chain.len() >= 4);
        engine.stop_mining();
        assert!(!engine.is_mining());

        let mined = engine.get_blockchain().len() as i64 - 1;
        assert!(mined >= 3);
        assert_eq!(engine.balance_of(wallet.get_address()), 50 * mined);
    }

    #[test]
    fn test_wallet_subscription() {
        let engine = Engine::new(test_config());
        let rx = engine.subscribe_wallets();
        assert!(rx.recv().unwrap().is_empty());

        let first = engine.create_wallet().unwrap();
        assert_eq!(rx.recv().unwrap().len(), 1);
        let second = engine.create_wallet().unwrap();
        let latest = rx.recv().unwrap();
        assert_eq!(latest.len(), 2);
        assert_eq!(latest[0].get_address(), first.get_address());
        assert_eq!(latest[1].get_address(), second.get_address());
        assert_eq!(engine.get_wallets().len(), 2);
    }

    #[test]
    fn test_clones_share_collaborators() {
        let engine = Engine::new(test_config());
        let handle = engine.clone();
        handle.create_wallet().unwrap();
        assert_eq!(engine.get_wallets().len(), 1);

        handle.start_mining("alice").unwrap();
        assert!(engine.get_miner().is_mining());
        engine.stop_mining();
        assert!(!handle.is_mining());
    }

    #[test]
    fn test_unknown_address_has_zero_balance() {
        let engine = Engine::new(test_config());
        assert_eq!(engine.balance_of("nobody"), 0);
    }
}
