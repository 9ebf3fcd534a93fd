// This is the mining engine - it keeps extending the chain for one beneficiary
// Each cycle builds a coinbase-only block on the current tail, searches for a
// nonce, and tries to append. Losing an append race just means starting over
// on the new tail.

use crate::config::MinerConfig;
use crate::core::{Block, BlockBuilder, Blockchain, ProofOfWork, Transaction};
use crate::error::{BlockchainError, Result};
use crate::state::{Published, Subscription};
use log::{debug, error, info};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

/// The candidate the miner is working on, or the block it just mined
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MiningProgress {
    pub beneficiary: String,
    pub index: u64,
    pub nonce: u64,
    pub hash: String,
    pub difficulty: u32,
}

impl MiningProgress {
    fn from_candidate(beneficiary: &str, builder: &BlockBuilder, hash: &str) -> MiningProgress {
        MiningProgress {
            beneficiary: beneficiary.to_string(),
            index: builder.index,
            nonce: builder.nonce,
            hash: hash.to_string(),
            difficulty: builder.difficulty,
        }
    }

    fn from_block(beneficiary: &str, block: &Block) -> MiningProgress {
        MiningProgress {
            beneficiary: beneficiary.to_string(),
            index: block.get_index(),
            nonce: block.get_nonce(),
            hash: block.get_hash().to_string(),
            difficulty: block.get_difficulty(),
        }
    }
}

/// `None` while idle
pub type ProgressSnapshot = Arc<Option<MiningProgress>>;

/// Run one mining cycle against the current tail.
///
/// Returns `Ok(Some(block))` once the block is on the chain, `Ok(None)` if
/// `cancel` was set before it could be appended, and a chain-integrity error
/// if another block took the tail first.
pub fn mine_next_block<F>(
    blockchain: &Blockchain,
    beneficiary: &str,
    config: &MinerConfig,
    cancel: &AtomicBool,
    on_progress: F,
) -> Result<Option<Block>>
where
    F: FnMut(&BlockBuilder, &str),
{
    let tail = blockchain.tail();
    let coinbase_tx = Transaction::new_coinbase_tx(beneficiary, config.reward)?;
    let builder = BlockBuilder::new(
        tail.get_index() + 1,
        tail.get_hash(),
        config.difficulty,
        vec![coinbase_tx],
    )?;

    let pow = ProofOfWork::new_proof_of_work(builder);
    let block = match pow.run(cancel, config.progress_interval, on_progress) {
        Some(block) => block,
        None => return Ok(None),
    };

    // Nothing may be appended once a stop has been requested
    if cancel.load(Ordering::Relaxed) {
        return Ok(None);
    }

    blockchain.append(block.clone())?;
    Ok(Some(block))
}

struct MiningSession {
    beneficiary: String,
    cancel: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl MiningSession {
    fn stop(self) {
        self.cancel.store(true, Ordering::Relaxed);
        if self.handle.join().is_err() {
            error!("Mining thread for {} panicked", self.beneficiary);
        }
    }
}

/// Background miner with explicit start/stop.
///
/// At most one mining thread runs at a time. Dropping the miner stops it.
pub struct Miner {
    blockchain: Blockchain,
    config: MinerConfig,
    progress: Published<Option<MiningProgress>>,
    session: Mutex<Option<MiningSession>>,
}

impl Miner {
    pub fn new(blockchain: Blockchain, config: MinerConfig) -> Miner {
        Miner {
            blockchain,
            config,
            progress: Published::new(None),
            session: Mutex::new(None),
        }
    }

    /// Start mining for `beneficiary`, replacing any running session
    pub fn start(&self, beneficiary: &str) -> Result<()> {
        self.config.validate()?;

        let mut session = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = session.take() {
            info!("Restarting miner, stopping session for {}", previous.beneficiary);
            previous.stop();
            self.progress.set(None);
        }

        let cancel = Arc::new(AtomicBool::new(false));
        let handle = {
            let blockchain = self.blockchain.clone();
            let progress = self.progress.clone();
            let config = self.config;
            let cancel = Arc::clone(&cancel);
            let beneficiary = beneficiary.to_string();
            thread::Builder::new()
                .name("miner".to_string())
                .spawn(move || {
                    run_mining_loop(blockchain, beneficiary, config, cancel, progress)
                })
                .map_err(|e| {
                    BlockchainError::Mining(format!("Failed to spawn miner thread: {e}"))
                })?
        };

        *session = Some(MiningSession {
            beneficiary: beneficiary.to_string(),
            cancel,
            handle,
        });
        Ok(())
    }

    /// Stop mining and wait for the thread to exit. No-op when idle.
    pub fn stop(&self) {
        let session = self
            .session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(session) = session {
            let beneficiary = session.beneficiary.clone();
            session.stop();
            self.progress.set(None);
            info!("Mining stopped for {beneficiary}");
        }
    }

    /// True while a session is active and its thread has not exited
    pub fn is_mining(&self) -> bool {
        self.session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|session| !session.handle.is_finished())
    }

    pub fn beneficiary(&self) -> Option<String> {
        self.session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|session| session.beneficiary.clone())
    }

    pub fn progress(&self) -> ProgressSnapshot {
        self.progress.get()
    }

    pub fn subscribe_progress(&self) -> Subscription<Option<MiningProgress>> {
        self.progress.subscribe()
    }

    pub fn get_config(&self) -> MinerConfig {
        self.config
    }
}

impl Drop for Miner {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_mining_loop(
    blockchain: Blockchain,
    beneficiary: String,
    config: MinerConfig,
    cancel: Arc<AtomicBool>,
    progress: Published<Option<MiningProgress>>,
) {
    info!(
        "Mining started for {beneficiary} (difficulty: {}, reward: {})",
        config.difficulty, config.reward
    );

    while !cancel.load(Ordering::Relaxed) {
        let report = |builder: &BlockBuilder, hash: &str| {
            progress.set(Some(MiningProgress::from_candidate(
                &beneficiary,
                builder,
                hash,
            )))
        };
        let result = mine_next_block(&blockchain, &beneficiary, &config, &cancel, report);

        match result {
            Ok(Some(block)) => {
                info!(
                    "Mined block {} with nonce {}: {}",
                    block.get_index(),
                    block.get_nonce(),
                    block.get_hash()
                );
                progress.set(Some(MiningProgress::from_block(&beneficiary, &block)));
            }
            Ok(None) => break,
            Err(e) if e.is_chain_integrity() => {
                debug!("Candidate lost the tail, retrying: {e}");
            }
            Err(e) => {
                error!("Mining aborted: {e}");
                break;
            }
        }
    }
}
