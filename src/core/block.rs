use crate::core::{ProofOfWork, Transaction};
use crate::error::Result;
use crate::utils::{current_timestamp, sha256_hex};
use serde::Serialize;

/// Previous-hash sentinel carried by the genesis block
pub const GENESIS_PREVIOUS_HASH: &str =
    "0000000000000000000000000000000000000000000000000000000000000000";

/// Genesis is fixed so every ledger starts from the same hash
pub const GENESIS_TIMESTAMP: i64 = 0;

// Separator between fields (and between transactions) in the hashed encoding
const LINE_SEPARATOR: &str = "\n";

/// An immutable, mined ledger record.
///
/// A `Block` can only be produced by [`BlockBuilder::build`] or
/// [`Block::genesis`], and its proof-of-work is checked on construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Block {
    index: u64,
    difficulty: u32,
    previous_hash: String,
    timestamp: i64,
    transactions: Vec<Transaction>,
    nonce: u64,
    hash: String,
}

/// Mutable working state of a block while its nonce is searched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockBuilder {
    pub index: u64,
    pub difficulty: u32,
    pub previous_hash: String,
    pub timestamp: i64,
    pub transactions: Vec<Transaction>,
    pub nonce: u64,
}

impl BlockBuilder {
    pub fn new(
        index: u64,
        previous_hash: &str,
        difficulty: u32,
        transactions: Vec<Transaction>,
    ) -> Result<BlockBuilder> {
        Ok(BlockBuilder {
            index,
            difficulty,
            previous_hash: previous_hash.to_string(),
            timestamp: current_timestamp()?,
            transactions,
            nonce: 0,
        })
    }

    /// Digest of the current field values, recomputed on every call
    pub fn hash(&self) -> String {
        sha256_hex(self.canonical_string().as_bytes())
    }

    pub fn is_valid(&self) -> bool {
        ProofOfWork::meets_difficulty(&self.hash(), self.difficulty)
    }

    /// Snapshot into an immutable [`Block`].
    ///
    /// # Panics
    ///
    /// If the current nonce does not satisfy the difficulty. Callers must
    /// check [`is_valid`](Self::is_valid) first.
    pub fn build(&self) -> Block {
        Block::new(
            self.index,
            self.difficulty,
            self.previous_hash.clone(),
            self.timestamp,
            self.transactions.clone(),
            self.nonce,
        )
    }

    fn canonical_string(&self) -> String {
        canonical_string(
            self.index,
            self.difficulty,
            &self.previous_hash,
            self.timestamp,
            &self.transactions,
            self.nonce,
        )
    }
}

impl Block {
    fn new(
        index: u64,
        difficulty: u32,
        previous_hash: String,
        timestamp: i64,
        transactions: Vec<Transaction>,
        nonce: u64,
    ) -> Block {
        let hash = sha256_hex(
            canonical_string(
                index,
                difficulty,
                &previous_hash,
                timestamp,
                &transactions,
                nonce,
            )
            .as_bytes(),
        );

        assert!(
            ProofOfWork::meets_difficulty(&hash, difficulty),
            "block {index} hash {hash} does not meet difficulty {difficulty}"
        );

        Block {
            index,
            difficulty,
            previous_hash,
            timestamp,
            transactions,
            nonce,
            hash,
        }
    }

    /// Index 0, difficulty 0, no transactions, all-zero previous hash
    pub fn genesis() -> Block {
        Block::new(
            0,
            0,
            GENESIS_PREVIOUS_HASH.to_string(),
            GENESIS_TIMESTAMP,
            vec![],
            0,
        )
    }

    pub fn get_index(&self) -> u64 {
        self.index
    }

    pub fn get_difficulty(&self) -> u32 {
        self.difficulty
    }

    pub fn get_pre_block_hash(&self) -> &str {
        self.previous_hash.as_str()
    }

    pub fn get_timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn get_transactions(&self) -> &[Transaction] {
        self.transactions.as_slice()
    }

    pub fn get_nonce(&self) -> u64 {
        self.nonce
    }

    pub fn get_hash(&self) -> &str {
        self.hash.as_str()
    }

    /// Hash recomputed from the stored fields, for verification
    pub fn recompute_hash(&self) -> String {
        sha256_hex(
            canonical_string(
                self.index,
                self.difficulty,
                &self.previous_hash,
                self.timestamp,
                &self.transactions,
                self.nonce,
            )
            .as_bytes(),
        )
    }
}

// Frozen field order: index, difficulty, previous hash, timestamp,
// transactions (one per line, in list order), nonce.
fn canonical_string(
    index: u64,
    difficulty: u32,
    previous_hash: &str,
    timestamp: i64,
    transactions: &[Transaction],
    nonce: u64,
) -> String {
    let transactions = transactions
        .iter()
        .map(Transaction::to_string)
        .collect::<Vec<_>>()
        .join(LINE_SEPARATOR);

    [
        index.to_string(),
        difficulty.to_string(),
        previous_hash.to_string(),
        timestamp.to_string(),
        transactions,
        nonce.to_string(),
    ]
    .join(LINE_SEPARATOR)
}
