#![forbid(unsafe_code)]
use clap::{Parser, Subcommand};
use colored::*;
use dualchain::blockchain::Blockchain;
use dualchain::cli::{render_chain_table, sample_transactions};
use dualchain::config::{load_config, Config, DEFAULT_CONFIG_PATH};
use dualchain::consensus::ConsensusMode;
use dualchain::error::ChainError;
use std::path::PathBuf;
use std::time::Instant;
use tracing::Level;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    /// Override consensus.pow_difficulty
    #[arg(long)]
    difficulty: Option<u32>,
    /// Print the chain as JSON instead of a table
    #[arg(long)]
    json: bool,
    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Append PoW blocks, then PoS blocks, and validate the chain
    Demo {
        #[arg(long, default_value_t = 2)]
        pow_blocks: usize,
        #[arg(long, default_value_t = 2)]
        pos_blocks: usize,
        /// Transactions per block
        #[arg(long, default_value_t = 3)]
        txs: usize,
    },
    /// Mine N Proof-of-Work blocks
    Mine {
        #[arg(long, default_value_t = 3)]
        blocks: usize,
        #[arg(long, default_value_t = 3)]
        txs: usize,
    },
    /// Append N Proof-of-Stake blocks
    Stake {
        #[arg(long, default_value_t = 3)]
        blocks: usize,
        #[arg(long, default_value_t = 3)]
        txs: usize,
    },
    /// Append blocks using the configured consensus mode
    Run {
        #[arg(long, default_value_t = 3)]
        blocks: usize,
        #[arg(long, default_value_t = 3)]
        txs: usize,
    },
    /// Time PoW against PoS sealing of the same batch
    Compare {
        #[arg(long, default_value_t = 4)]
        txs: usize,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .with_target(false)
        .init();

    let mut config = load_config(&cli.config)?;
    if let Some(difficulty) = cli.difficulty {
        config.consensus.pow_difficulty = difficulty;
        config.validate()?;
    }
    let mut chain = Blockchain::from_config(&config);

    match cli.command {
        Commands::Demo { pow_blocks, pos_blocks, txs } => {
            demo(&mut chain, pow_blocks, pos_blocks, txs)?;
        }
        Commands::Mine { blocks, txs } => {
            append_blocks(&mut chain, ConsensusMode::Pow, blocks, txs)?;
        }
        Commands::Stake { blocks, txs } => {
            append_blocks(&mut chain, ConsensusMode::Pos, blocks, txs)?;
        }
        Commands::Run { blocks, txs } => {
            append_blocks(&mut chain, config.consensus.mode, blocks, txs)?;
        }
        Commands::Compare { txs } => {
            compare(&config, txs)?;
            return Ok(());
        }
    }

    report(&chain, cli.json)
}

fn demo(chain: &mut Blockchain, pow_blocks: usize, pos_blocks: usize, txs: usize) -> Result<(), ChainError> {
    let mut rng = rand::thread_rng();

    println!(
        "{}",
        format!("⛏️  Appending {} PoW blocks (difficulty = {})", pow_blocks, chain.difficulty()).bright_cyan()
    );
    for _ in 0..pow_blocks {
        let started = Instant::now();
        let block = chain.append_pow(sample_transactions(&mut rng, txs))?;
        print_block_line(block.index(), &block.digest().to_string(), &block.consensus_info(), started);
    }

    println!("{}", format!("🪙 Appending {} PoS blocks", pos_blocks).bright_cyan());
    for _ in 0..pos_blocks {
        let started = Instant::now();
        let block = chain.append_pos(sample_transactions(&mut rng, txs))?;
        print_block_line(block.index(), &block.digest().to_string(), &block.consensus_info(), started);
    }
    Ok(())
}

fn append_blocks(chain: &mut Blockchain, mode: ConsensusMode, blocks: usize, txs: usize) -> Result<(), ChainError> {
    let mut rng = rand::thread_rng();
    println!("{}", format!("Appending {} {} blocks", blocks, mode).bright_cyan());
    for _ in 0..blocks {
        let started = Instant::now();
        let block = chain.append(mode, sample_transactions(&mut rng, txs))?;
        print_block_line(block.index(), &block.digest().to_string(), &block.consensus_info(), started);
    }
    Ok(())
}

fn compare(config: &Config, txs: usize) -> Result<(), ChainError> {
    let mut rng = rand::thread_rng();
    let batch = sample_transactions(&mut rng, txs);

    let mut timings = Vec::new();
    for mode in [ConsensusMode::Pow, ConsensusMode::Pos] {
        let mut chain = Blockchain::from_config(config);
        let started = Instant::now();
        let block = chain.append(mode, batch.clone())?;
        let elapsed = started.elapsed();
        println!(
            "{:<4} {} {}",
            mode.to_string().bright_white(),
            block.consensus_info(),
            humantime::format_duration(elapsed).to_string().yellow()
        );
        timings.push(elapsed);
    }

    if let [pow, pos] = timings.as_slice() {
        if !pos.is_zero() {
            println!(
                "{}",
                format!("PoS sealed {:.1}x faster", pow.as_secs_f64() / pos.as_secs_f64()).bright_green()
            );
        }
    }
    Ok(())
}

fn print_block_line(index: u64, digest: &str, consensus: &str, started: Instant) {
    println!(
        "  {} [{}] {}",
        format!("Block #{}", index).bright_white(),
        humantime::format_duration(started.elapsed()),
        consensus.yellow()
    );
    println!("    Digest: {}", digest);
}

fn report(chain: &Blockchain, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(chain.blocks())?);
    } else {
        println!("\n{}", render_chain_table(chain));
    }

    match chain.verify() {
        Ok(()) => println!("{}", "✅ Chain is valid".bright_green()),
        Err(e) => println!("{} {}", "❌ Chain is corrupt:".bright_red(), e),
    }
    Ok(())
}
