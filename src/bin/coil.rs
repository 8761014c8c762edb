#![forbid(unsafe_code)]
//! coil - command-line client for the Coil network

use clap::{Parser, Subcommand};
use colored::*;
use coil::blockchain::Amount;
use coil::cli::{self, UpdateOutcome};
use coil::config::{default_config_path, load_config, Config};
use coil::sync::PeerClient;
use coil::wallet::Wallet;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::Level;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config.toml (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log peer traffic and cache decisions
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download the chain from the first responsive peer
    Update,
    /// Reconstruct the transaction history of one or more addresses
    History {
        #[arg(required = true)]
        addresses: Vec<String>,
        /// Print a table instead of JSON
        #[arg(long)]
        table: bool,
    },
    /// Ask a peer for the balance of an address
    Balance { address: String },
    /// Send coins from a wallet file to an address
    Send {
        wallet_path: PathBuf,
        address: String,
        /// Amount to send, sent to peers as a float
        #[arg(value_parser = Amount::parse_float, allow_negative_numbers = true)]
        amount: Amount,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "[coil]".red().bold(), e.to_string().red());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config_path = cli.config.unwrap_or_else(default_config_path);
    let config = load_config(&config_path)?;

    match cli.command {
        Commands::Update => update(&config),
        Commands::History { addresses, table } => history(&config, &addresses, table),
        Commands::Balance { address } => balance(&config, &address),
        Commands::Send {
            wallet_path,
            address,
            amount,
        } => send(&config, &wallet_path, &address, amount),
    }
}

fn update(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("{}", "[coil] Attempting to fetch chain from node".bright_cyan());
    let client = PeerClient::from_config(&config.network)?;
    let store = cli::chain_store_from_config(config);

    match cli::update(&client, &store)? {
        UpdateOutcome::Updated { blocks } => eprintln!(
            "{}",
            format!("[coil] Successfully downloaded chain from peers ({} blocks)", blocks)
                .bright_green()
        ),
        UpdateOutcome::UpToDate { blocks } => eprintln!(
            "{}",
            format!("[coil] Coil is up-to-date ({} blocks)", blocks).bright_green()
        ),
    }
    Ok(())
}

fn history(
    config: &Config,
    addresses: &[String],
    table: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = cli::chain_store_from_config(config);
    let histories = cli::history(&store, addresses)?;

    if table {
        for h in &histories {
            println!("{}", cli::render_history_table(h));
        }
    } else if let [single] = histories.as_slice() {
        println!("{}", cli::to_pretty_json(single)?);
    } else {
        println!("{}", cli::to_pretty_json(&histories)?);
    }
    Ok(())
}

fn balance(config: &Config, address: &str) -> Result<(), Box<dyn std::error::Error>> {
    let client = PeerClient::from_config(&config.network)?;
    let answer = cli::balance(&client, address)?;
    println!("{}", cli::to_pretty_json(&answer)?);
    Ok(())
}

fn send(
    config: &Config,
    wallet_path: &Path,
    address: &str,
    amount: Amount,
) -> Result<(), Box<dyn std::error::Error>> {
    let wallet = Wallet::load(wallet_path)?;
    let client = PeerClient::from_config(&config.network)?;
    let store = cli::chain_store_from_config(config);

    eprintln!("{}", "[coil] Attempting to submit transaction to node".bright_cyan());
    let answer = cli::send(&client, &store, &wallet, address, amount)?;
    println!("{}", cli::to_pretty_json(&answer)?);
    Ok(())
}
