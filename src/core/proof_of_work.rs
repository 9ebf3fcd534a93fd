use crate::core::{Block, BlockBuilder};
use std::sync::atomic::{AtomicBool, Ordering};

/// Nonce search over a [`BlockBuilder`]
pub struct ProofOfWork {
    builder: BlockBuilder,
}

impl ProofOfWork {
    pub fn new_proof_of_work(builder: BlockBuilder) -> ProofOfWork {
        ProofOfWork { builder }
    }

    /// True if `hash` starts with at least `difficulty` `'0'` hex digits
    pub fn meets_difficulty(hash: &str, difficulty: u32) -> bool {
        let difficulty = difficulty as usize;
        hash.len() >= difficulty && hash.bytes().take(difficulty).all(|b| b == b'0')
    }

    /// Validate a block's stored hash against its fields and its difficulty
    pub fn validate(block: &Block) -> bool {
        block.recompute_hash() == block.get_hash()
            && Self::meets_difficulty(block.get_hash(), block.get_difficulty())
    }

    /// Search nonces from the builder's current nonce upwards.
    ///
    /// `cancel` is polled before every attempt; returns `None` once it is set.
    /// `on_progress` is called with the candidate and its hash every
    /// `progress_interval` attempts (never when the interval is 0).
    pub fn run<F>(
        mut self,
        cancel: &AtomicBool,
        progress_interval: u64,
        mut on_progress: F,
    ) -> Option<Block>
    where
        F: FnMut(&BlockBuilder, &str),
    {
        let mut attempts: u64 = 0;
        loop {
            if cancel.load(Ordering::Relaxed) {
                return None;
            }

            let hash = self.builder.hash();
            if Self::meets_difficulty(&hash, self.builder.difficulty) {
                return Some(self.builder.build());
            }

            attempts += 1;
            if progress_interval > 0 && attempts % progress_interval == 0 {
                on_progress(&self.builder, &hash);
            }
            self.builder.nonce = self.builder.nonce.wrapping_add(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Transaction, GENESIS_PREVIOUS_HASH};

    fn create_test_builder(difficulty: u32) -> BlockBuilder {
        let coinbase_tx = Transaction::with_timestamp("COINBASE", "miner", 50, 1_700_000_000_000);
        BlockBuilder {
            index: 1,
            difficulty,
            previous_hash: GENESIS_PREVIOUS_HASH.to_string(),
            timestamp: 1_700_000_000_000,
            transactions: vec![coinbase_tx],
            nonce: 0,
        }
    }

    #[test]
    fn test_meets_difficulty() {
        assert!(ProofOfWork::meets_difficulty("abc", 0));
        assert!(ProofOfWork::meets_difficulty("00ab", 2));
        assert!(ProofOfWork::meets_difficulty("000b", 2));
        assert!(!ProofOfWork::meets_difficulty("0a0b", 2));
        assert!(!ProofOfWork::meets_difficulty("00", 3));
    }

    #[test]
    fn test_difficulty_zero_succeeds_on_first_nonce() {
        let cancel = AtomicBool::new(false);
        let block = ProofOfWork::new_proof_of_work(create_test_builder(0))
            .run(&cancel, 0, |_, _| {})
            .unwrap();
        assert_eq!(block.get_nonce(), 0);
    }

    #[test]
    fn test_run_finds_valid_block() {
        let cancel = AtomicBool::new(false);
        let block = ProofOfWork::new_proof_of_work(create_test_builder(2))
            .run(&cancel, 0, |_, _| {})
            .unwrap();

        assert!(block.get_hash().starts_with("00"));
        assert!(ProofOfWork::validate(&block));
    }

    #[test]
    fn test_run_stops_when_cancelled() {
        let cancel = AtomicBool::new(true);
        // Unreachable difficulty: only cancellation can end the search
        let result =
            ProofOfWork::new_proof_of_work(create_test_builder(64)).run(&cancel, 0, |_, _| {});
        assert!(result.is_none());
    }

    #[test]
    fn test_progress_reports_and_cancellation_from_callback() {
        let cancel = AtomicBool::new(false);
        let mut reports = Vec::new();

        let result = ProofOfWork::new_proof_of_work(create_test_builder(64)).run(
            &cancel,
            10,
            |builder, hash| {
                reports.push((builder.nonce, hash.to_string()));
                if reports.len() == 3 {
                    cancel.store(true, Ordering::Relaxed);
                }
            },
        );

        assert!(result.is_none());
        let nonces: Vec<u64> = reports.iter().map(|(nonce, _)| *nonce).collect();
        assert_eq!(nonces, vec![9, 19, 29]);
    }

    #[test]
    fn test_validate_mined_and_genesis_blocks() {
        let cancel = AtomicBool::new(false);
        let block = ProofOfWork::new_proof_of_work(create_test_builder(1))
            .run(&cancel, 0, |_, _| {})
            .unwrap();
        assert!(ProofOfWork::validate(&block));
        assert!(ProofOfWork::validate(&Block::genesis()));
    }
}
