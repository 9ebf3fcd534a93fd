// This is the ledger - the ordered, append-only list of blocks
// It always starts with the genesis block and only ever grows at the tail.
// Every change is published as a whole new snapshot, so readers never see
// a half-appended block and older snapshots never change under them.

use crate::core::{Block, ProofOfWork};
use crate::error::{BlockchainError, Result};
use crate::state::{Published, Subscription};
use log::{debug, info};
use std::borrow::Borrow;
use std::sync::Arc;

/// The blocks of one chain version. Blocks are shared between versions, so
/// an append copies pointers rather than blocks.
pub type Chain = Vec<Arc<Block>>;

/// An immutable view of the chain at one point in time
pub type ChainSnapshot = Arc<Chain>;

// Cloning a Blockchain gives another handle to the same ledger
#[derive(Clone)]
pub struct Blockchain {
    blocks: Published<Chain>,
}

impl Default for Blockchain {
    fn default() -> Self {
        Self::new()
    }
}

impl Blockchain {
    // A fresh ledger holds exactly the genesis block
    pub fn new() -> Blockchain {
        Blockchain {
            blocks: Published::new(vec![Arc::new(Block::genesis())]),
        }
    }

    /// Append `block` if it extends the current tail.
    ///
    /// The tail check and the append happen under one writer lock, so of two
    /// candidates built on the same tail exactly one is accepted. A rejected
    /// block leaves the ledger untouched and returns
    /// [`BlockchainError::ChainIntegrity`].
    pub fn append(&self, block: Block) -> Result<()> {
        let index = block.get_index();
        let hash = block.get_hash().to_string();

        let result = self.blocks.update(|blocks| {
            check_link(last_block(blocks), &block)?;
            let mut next = Vec::with_capacity(blocks.len() + 1);
            next.extend(blocks.iter().cloned());
            next.push(Arc::new(block));
            Ok(next)
        });

        match result {
            Ok(_) => {
                info!("Appended block {index}: {hash}");
                Ok(())
            }
            Err(e) => {
                debug!("Rejected block {index}: {e}");
                Err(e)
            }
        }
    }

    /// The current last block
    pub fn tail(&self) -> Block {
        last_block(&self.blocks.get()).clone()
    }

    /// Stable copy of the chain; later appends do not affect it
    pub fn snapshot(&self) -> ChainSnapshot {
        self.blocks.get()
    }

    /// Current chain now, then every new chain as blocks are appended
    pub fn subscribe(&self) -> Subscription<Chain> {
        self.blocks.subscribe()
    }

    /// Sum received minus sum sent by `address`, over the whole chain
    pub fn balance_of(&self, address: &str) -> i64 {
        balance_in(self.snapshot().as_slice(), address)
    }

    pub fn len(&self) -> usize {
        self.blocks.get().len()
    }

    // Always false: genesis is never removed
    pub fn is_empty(&self) -> bool {
        self.blocks.get().is_empty()
    }

    pub fn get_block(&self, index: u64) -> Option<Block> {
        let blocks = self.blocks.get();
        usize::try_from(index)
            .ok()
            .and_then(|i| blocks.get(i))
            .map(|block| block.as_ref().clone())
    }

    /// Re-check linkage and proof-of-work across the whole current chain
    pub fn verify(&self) -> Result<()> {
        verify_chain(self.snapshot().as_slice())
    }
}

// Chains start at genesis and only grow, so there is always a last block
fn last_block(blocks: &[Arc<Block>]) -> &Block {
    match blocks.last() {
        Some(block) => block,
        None => unreachable!("ledger lost its genesis block"),
    }
}

/// Replay `blocks` and compute the balance of `address`
pub fn balance_in<B: Borrow<Block>>(blocks: &[B], address: &str) -> i64 {
    let mut balance: i64 = 0;
    for block in blocks {
        let block: &Block = block.borrow();
        for transaction in block.get_transactions() {
            if transaction.get_to() == address {
                balance = balance.saturating_add_unsigned(transaction.get_amount());
            }
            if transaction.get_from() == address {
                balance = balance.saturating_sub_unsigned(transaction.get_amount());
            }
        }
    }
    balance
}

/// Check every block's proof-of-work and every adjacent pair's linkage
pub fn verify_chain<B: Borrow<Block>>(blocks: &[B]) -> Result<()> {
    for block in blocks {
        let block: &Block = block.borrow();
        if !ProofOfWork::validate(block) {
            return Err(BlockchainError::ChainIntegrity(format!(
                "Invalid proof of work for block {}",
                block.get_index()
            )));
        }
    }
    for pair in blocks.windows(2) {
        check_link(pair[0].borrow(), pair[1].borrow())?;
    }
    Ok(())
}

fn check_link(previous: &Block, block: &Block) -> Result<()> {
    if block.get_pre_block_hash() != previous.get_hash() {
        return Err(BlockchainError::ChainIntegrity(format!(
            "Invalid previous hash for block {}: expected {}, got {}",
            block.get_index(),
            previous.get_hash(),
            block.get_pre_block_hash()
        )));
    }
    if previous.get_index().checked_add(1) != Some(block.get_index()) {
        return Err(BlockchainError::ChainIntegrity(format!(
            "Invalid block index: expected {}, got {}",
            previous.get_index().saturating_add(1),
            block.get_index()
        )));
    }
    Ok(())
}
