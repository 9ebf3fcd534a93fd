use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "miner-chain")]
pub struct Opt {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(name = "createwallet", about = "Create a new wallet")]
    Createwallet,
    #[command(
        name = "mine",
        about = "Mine blocks to a fresh wallet, then print the chain and its balance"
    )]
    Mine {
        #[arg(long, default_value_t = 3, help = "Blocks to mine past genesis")]
        blocks: usize,
        #[arg(long, help = "Leading zero hex digits (overrides MINER_DIFFICULTY)")]
        difficulty: Option<u32>,
        #[arg(long, help = "Coinbase reward per block (overrides MINER_REWARD)")]
        reward: Option<u64>,
        #[arg(long, help = "Print the chain as JSON")]
        json: bool,
    },
    #[command(name = "hash", about = "Print the SHA-256 digest of a string")]
    Hash {
        #[arg(help = "Text to hash")]
        input: String,
    },
}
