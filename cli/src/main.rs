//! cipherlend CLI
//!
//! Command-line interface for standing up and exercising confidential
//! lending pools.
//!
//! # Usage
//!
//! ```bash
//! # Write a default deployment (WETH collateral, USDC borrowable)
//! cipherlend init
//!
//! # Run supply / borrow / repay against it on plaintext values
//! cipherlend simulate
//!
//! # Same scenario on TFHE ciphertexts
//! cipherlend simulate --backend tfhe --borrow 600
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod config;
mod logging;

use commands::{InitCommand, SimulateCommand};

/// Confidential lending ledger
#[derive(Parser)]
#[command(name = "cipherlend")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Confidential lending ledger over encrypted balances", long_about = None)]
struct Cli {
    /// Path to deployment file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Data directory
    #[arg(short, long, global = true, env = "CIPHERLEND_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default deployment file
    Init(InitCommand),

    /// Deploy a pool in memory and run a sample scenario
    Simulate(SimulateCommand),

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    logging::init(&cli.log_level, cli.json_logs)?;

    match cli.command {
        Commands::Init(cmd) => cmd.execute(cli.config, cli.data_dir).await,
        Commands::Simulate(cmd) => cmd.execute(cli.config, cli.data_dir).await,
        Commands::Version => {
            println!("cipherlend {}", env!("CARGO_PKG_VERSION"));
            println!("Prices: 10^8 fixed point, collateral factors in basis points");
            Ok(())
        }
    }
}
