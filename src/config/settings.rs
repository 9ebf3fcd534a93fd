use crate::error::{BlockchainError, Result};
use crate::utils::HASH_HEX_LEN;
use std::env;
use std::str::FromStr;

const DEFAULT_DIFFICULTY: u32 = 5;
const DEFAULT_REWARD: u64 = 50;
const DEFAULT_PROGRESS_INTERVAL: u64 = 100_000;

const DIFFICULTY_KEY: &str = "MINER_DIFFICULTY";
const REWARD_KEY: &str = "MINER_REWARD";
const PROGRESS_INTERVAL_KEY: &str = "MINER_PROGRESS_INTERVAL";

/// Mining settings, built once at startup and handed to the miner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinerConfig {
    /// Leading zero hex digits every mined block must have
    pub difficulty: u32,
    /// Coinbase amount paid per block
    pub reward: u64,
    /// Nonce attempts between progress reports; 0 disables them
    pub progress_interval: u64,
}

impl Default for MinerConfig {
    fn default() -> Self {
        MinerConfig {
            difficulty: DEFAULT_DIFFICULTY,
            reward: DEFAULT_REWARD,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

impl MinerConfig {
    /// Defaults overlaid with `MINER_DIFFICULTY`, `MINER_REWARD` and
    /// `MINER_PROGRESS_INTERVAL` when they are set
    pub fn from_env() -> Result<MinerConfig> {
        let mut config = MinerConfig::default();
        if let Some(difficulty) = read_var(DIFFICULTY_KEY)? {
            config.difficulty = difficulty;
        }
        if let Some(reward) = read_var(REWARD_KEY)? {
            config.reward = reward;
        }
        if let Some(interval) = read_var(PROGRESS_INTERVAL_KEY)? {
            config.progress_interval = interval;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn with_difficulty(mut self, difficulty: u32) -> Self {
        self.difficulty = difficulty;
        self
    }

    pub fn with_reward(mut self, reward: u64) -> Self {
        self.reward = reward;
        self
    }

    pub fn with_progress_interval(mut self, progress_interval: u64) -> Self {
        self.progress_interval = progress_interval;
        self
    }

    /// A difficulty longer than the digest can never be met
    pub fn validate(&self) -> Result<()> {
        if self.difficulty as usize > HASH_HEX_LEN {
            return Err(BlockchainError::Config(format!(
                "difficulty {} exceeds the {HASH_HEX_LEN} hex digits of a hash",
                self.difficulty
            )));
        }
        Ok(())
    }
}

fn read_var<T: FromStr>(key: &str) -> Result<Option<T>> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| BlockchainError::Config(format!("invalid value for {key}: {raw:?}"))),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MinerConfig::default();
        assert_eq!(config.difficulty, 5);
        assert_eq!(config.reward, 50);
        assert_eq!(config.progress_interval, 100_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_setters() {
        let config = MinerConfig::default()
            .with_difficulty(2)
            .with_reward(10)
            .with_progress_interval(0);
        assert_eq!(
            config,
            MinerConfig {
                difficulty: 2,
                reward: 10,
                progress_interval: 0
            }
        );
    }

    #[test]
    fn test_validate_rejects_impossible_difficulty() {
        let config = MinerConfig::default().with_difficulty(65);
        assert!(matches!(config.validate(), Err(BlockchainError::Config(_))));
        assert!(MinerConfig::default().with_difficulty(64).validate().is_ok());
    }

    // Env vars are process-wide, so every env case lives in one test
    #[test]
    fn test_from_env() {
        env::set_var(DIFFICULTY_KEY, "3");
        env::set_var(REWARD_KEY, " 25 ");
        env::remove_var(PROGRESS_INTERVAL_KEY);
        let config = MinerConfig::from_env().unwrap();
        assert_eq!(config.difficulty, 3);
        assert_eq!(config.reward, 25);
        assert_eq!(config.progress_interval, DEFAULT_PROGRESS_INTERVAL);

        env::set_var(DIFFICULTY_KEY, "lots");
        assert!(matches!(
            MinerConfig::from_env(),
            Err(BlockchainError::Config(_))
        ));

        env::set_var(DIFFICULTY_KEY, "99");
        assert!(MinerConfig::from_env().is_err());

        env::remove_var(DIFFICULTY_KEY);
        env::remove_var(REWARD_KEY);
    }
}
