//! txforge CLI
//!
//! Thin command wiring over the library's entry points: fee estimation and
//! lookup-table resolution diagnostics. Business transactions (minting,
//! authority transfers) are assembled and signed elsewhere; this binary
//! never holds keys.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use txforge::budget::{estimate, LookupTableResolver};
use txforge::config::Config;
use txforge::network::{ConnectionProvider, NetworkId};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "txforge.toml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Estimate the current priority-fee price from recent slots
    PriorityFees {
        /// Target network
        #[arg(long, value_enum)]
        network: NetworkId,

        /// Scope the fee history to one account or program address
        #[arg(long)]
        address: Option<String>,
    },

    /// Resolve and display the network's published lookup table
    LookupTable {
        /// Target network
        #[arg(long, value_enum)]
        network: NetworkId,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = load_config(&args.config)?;
    let provider = ConnectionProvider::new(&config);

    match args.command {
        Command::PriorityFees { network, address } => {
            let target = address
                .map(|a| Pubkey::from_str(&a).with_context(|| format!("invalid address '{a}'")))
                .transpose()?;
            let rpc = provider.connection(network)?;

            let price = estimate(&rpc, target.as_ref()).await?;
            println!("network:  {network}");
            if let Some(target) = target {
                println!("address:  {target}");
            }
            println!("estimate: {price} micro-lamports per compute unit");
        }

        Command::LookupTable { network } => {
            let resolver = LookupTableResolver::new(config.lookup_table_registry()?);
            let rpc = provider.connection(network)?;

            let table = resolver.resolve(&rpc, network).await?;
            println!("network: {network}");
            println!("table:   {}", table.key);
            println!("entries: {}", table.addresses.len());
        }
    }

    Ok(())
}

/// Initialize logging subsystem
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "txforge=debug,info"
    } else {
        "txforge=info,warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Load configuration from file with fallback to built-in defaults
fn load_config(path: &str) -> Result<Config> {
    if std::path::Path::new(path).exists() {
        Config::from_file_with_env(path).with_context(|| format!("Failed to load config from {path}"))
    } else {
        warn!("Config file '{}' not found, using defaults", path);
        Ok(Config::default())
    }
}
