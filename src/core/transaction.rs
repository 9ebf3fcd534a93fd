// This file holds the transaction value - the only thing a block carries
// A transaction moves `amount` from one address to another. There are no
// inputs or signatures here; balances come from replaying every transaction.

use crate::error::Result;
use crate::utils::current_timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sender used for mining rewards; no funds are deducted from it
pub const COINBASE: &str = "COINBASE";

/// Separator between fields in the canonical encoding
const FIELD_SEPARATOR: &str = ",";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    from: String,
    to: String,
    amount: u64,
    timestamp: i64,
}

impl Transaction {
    // When I want a regular transfer stamped with the current time
    pub fn new(from: &str, to: &str, amount: u64) -> Result<Transaction> {
        Ok(Self::with_timestamp(from, to, amount, current_timestamp()?))
    }

    // I use this when the timestamp has to be fixed (replaying, tests)
    pub fn with_timestamp(from: &str, to: &str, amount: u64, timestamp: i64) -> Transaction {
        Transaction {
            from: from.to_string(),
            to: to.to_string(),
            amount,
            timestamp,
        }
    }

    // The miner pays itself with this - it's the only way new coins appear
    pub fn new_coinbase_tx(to: &str, reward: u64) -> Result<Transaction> {
        Self::new(COINBASE, to, reward)
    }

    pub fn is_coinbase(&self) -> bool {
        self.from == COINBASE
    }

    pub fn get_from(&self) -> &str {
        self.from.as_str()
    }

    pub fn get_to(&self) -> &str {
        self.to.as_str()
    }

    pub fn get_amount(&self) -> u64 {
        self.amount
    }

    pub fn get_timestamp(&self) -> i64 {
        self.timestamp
    }
}

// The canonical encoding that goes into block hashes: from,to,amount,timestamp
// Changing this changes every block hash, so the order is frozen.
impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{sep}{}{sep}{}{sep}{}",
            self.from,
            self.to,
            self.amount,
            self.timestamp,
            sep = FIELD_SEPARATOR
        )
    }
}
