// This is the entry point for the miner CLI
// Everything lives in memory, so each command builds its own engine, does its
// work and prints the result.
use clap::Parser;
use log::{error, info, LevelFilter};
use miner_chain::{sha256_hex, Block, Command, Engine, MinerConfig, Opt};
use std::process;
use std::time::Duration;

// How often I re-check that the miner is still alive while waiting for blocks
const WAIT_POLL: Duration = Duration::from_millis(500);

fn main() {
    // Info by default, RUST_LOG still wins when it's set
    env_logger::builder()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    let opt = Opt::parse();

    if let Err(e) = run_command(opt.command) {
        error!("Error: {e}");
        process::exit(1);
    }
}

fn run_command(command: Command) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Createwallet => {
            let engine = Engine::new(MinerConfig::from_env()?);
            let wallet = engine.create_wallet()?;
            println!("Your new address: {}", wallet.get_address());
            println!("Public key: {}", wallet.get_public_key());
        }
        Command::Mine {
            blocks,
            difficulty,
            reward,
            json,
        } => {
            let mut config = MinerConfig::from_env()?;
            if let Some(difficulty) = difficulty {
                config = config.with_difficulty(difficulty);
            }
            if let Some(reward) = reward {
                config = config.with_reward(reward);
            }
            config.validate()?;

            let engine = Engine::new(config);
            let wallet = engine.create_wallet()?;
            let address = wallet.get_address().to_string();
            info!("Mining {blocks} blocks to {address}");

            let chain_rx = engine.subscribe_chain();
            if blocks > 0 {
                engine.start_mining(&address)?;
                loop {
                    match chain_rx.recv_timeout(WAIT_POLL) {
                        Ok(chain) if chain.len() > blocks => break,
                        Ok(_) => {}
                        Err(_) if !engine.is_mining() => {
                            engine.stop_mining();
                            return Err("miner stopped before reaching the block count".into());
                        }
                        Err(_) => {}
                    }
                }
                engine.stop_mining();
            }

            let chain = engine.get_blockchain().snapshot();
            if json {
                let blocks: Vec<&Block> = chain.iter().map(|block| block.as_ref()).collect();
                println!("{}", serde_json::to_string_pretty(&blocks)?);
            } else {
                for block in chain.iter() {
                    print_block(block);
                }
            }
            println!("Balance of '{address}': {}", engine.balance_of(&address));
        }
        Command::Hash { input } => {
            println!("{}", sha256_hex(input.as_bytes()));
        }
    }
    Ok(())
}

fn print_block(block: &Block) {
    println!("{}", "-".repeat(70));
    println!("block: {}", block.get_index());
    println!("timestamp: {}", block.get_timestamp());
    println!("difficulty: {}", block.get_difficulty());
    println!("prev: {}", block.get_pre_block_hash());
    println!("hash: {}", block.get_hash());
    println!("nonce: {}", block.get_nonce());
    for tx in block.get_transactions() {
        println!("  tx: {} -> {} : {}", tx.get_from(), tx.get_to(), tx.get_amount());
    }
}
