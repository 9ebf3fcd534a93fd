//! Test utilities for blockchain testing

use crate::config::MinerConfig;
use crate::core::{Block, BlockBuilder, ProofOfWork, Transaction};
use std::sync::atomic::AtomicBool;
use crate::state::Subscription;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Difficulty low enough that tests mine in a handful of attempts
pub const TEST_DIFFICULTY: u32 = 1;

/// Miner configuration for fast tests
pub fn test_config() -> MinerConfig {
    MinerConfig::default()
        .with_difficulty(TEST_DIFFICULTY)
        .with_progress_interval(0)
}

/// A difficulty-0 block extending `tail`; `timestamp` keeps candidates distinct
pub fn build_block_on(tail: &Block, transactions: Vec<Transaction>, timestamp: i64) -> Block {
    BlockBuilder {
        index: tail.get_index() + 1,
        difficulty: 0,
        previous_hash: tail.get_hash().to_string(),
        timestamp,
        transactions,
        nonce: 0,
    }
    .build()
}

/// Mine a block extending `tail` at `difficulty`
pub fn mine_test_block(tail: &Block, transactions: Vec<Transaction>, difficulty: u32) -> Block {
    let builder = BlockBuilder {
        index: tail.get_index() + 1,
        difficulty,
        previous_hash: tail.get_hash().to_string(),
        timestamp: 1_700_000_000_000,
        transactions,
        nonce: 0,
    };
    let cancel = AtomicBool::new(false);
    ProofOfWork::new_proof_of_work(builder)
        .run(&cancel, 0, |_, _| {})
        .expect("uncancelled search always finds a nonce")
}

/// Wait until a snapshot on `rx` satisfies `done`, or panic after `timeout`
pub fn wait_for<T, F>(rx: &Subscription<T>, timeout: Duration, mut done: F) -> Arc<T>
where
    F: FnMut(&T) -> bool,
{
    let deadline = Instant::now() + timeout;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match rx.recv_timeout(remaining) {
            Ok(value) if done(&*value) => return value,
            Ok(_) => continue,
            Err(e) => panic!("condition not reached within {timeout:?}: {e}"),
        }
    }
}
