//! Quarry node - mining consensus and cross-chain settlement engine.
//!
//! This is the main entry point for the quarry-node binary.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

mod collaborators;
mod config;
mod node;

use config::NodeConfig;
use node::Node;

/// Mining consensus and cross-chain settlement node.
#[derive(Parser, Debug)]
#[command(name = "quarry-node")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "quarry-node.toml")]
    config: PathBuf,

    /// Data directory
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Path to a genesis state file (JSON)
    #[arg(long)]
    genesis: Option<PathBuf>,

    /// Enable local mining attempts
    #[arg(long)]
    mining: bool,

    /// Mining reward address
    #[arg(long)]
    mining_address: Option<String>,

    /// Block interval in milliseconds
    #[arg(long)]
    block_interval_ms: Option<u64>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Print version and exit
    #[arg(long)]
    version_info: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.version_info {
        print_version();
        return Ok(());
    }

    // Initialize logging
    let log_level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting Quarry Node v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = NodeConfig::load(&args.config, &args)?;

    info!("Data directory: {:?}", config.data_dir);
    info!("Block interval: {}ms", config.block_interval_ms);
    info!(
        "Mining: {}",
        if config.mining.enabled { "on" } else { "off" }
    );

    // Create and run node
    let node = Node::new(config)?;

    // Handle shutdown signals
    let node_handle = node.clone();
    let shutdown_signal = async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Shutdown signal received");
        node_handle.shutdown();
    };

    // Run the node until shutdown
    tokio::select! {
        result = node.run() => {
            if let Err(e) = result {
                tracing::error!("Node error: {}", e);
            }
        }
        _ = shutdown_signal => {
            info!("Shutdown complete");
        }
    }

    info!("Quarry node stopped");
    Ok(())
}

fn print_version() {
    println!("Quarry Node");
    println!("Version: {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Built with:");
    println!("  RocksDB for storage");
    println!("  Tokio for async runtime");
}
