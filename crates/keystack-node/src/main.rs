//! KeyStack Node - keyed LIFO stack service.
//!
//! Loads configuration, opens the configured storage backend and serves
//! the stack over JSON-RPC until interrupted.

pub mod config;
pub mod metrics;
pub mod node;
pub mod telemetry;

use clap::Parser;
use config::{LogFormat, NodeConfig, StorageBackend};
use std::path::PathBuf;
use tracing::{error, info};

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "keystack-node")]
#[command(about = "KeyStack Node - keyed LIFO stacks over JSON-RPC")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Args {
    /// Config file path
    #[arg(short, long, value_name = "FILE", env = "KEYSTACK_CONFIG")]
    config: Option<PathBuf>,

    /// Data directory
    #[arg(short, long, env = "KEYSTACK_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// RPC HTTP port
    #[arg(long, env = "KEYSTACK_RPC_PORT")]
    rpc_port: Option<u16>,

    /// Listen on all interfaces instead of loopback
    #[arg(long)]
    rpc_external: bool,

    /// Storage backend
    #[arg(long, value_enum)]
    backend: Option<StorageBackend>,

    /// Maximum elements per stack
    #[arg(long)]
    max_depth: Option<u64>,

    /// Log level
    #[arg(short, long, env = "KEYSTACK_LOG")]
    log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Append logs to this file instead of stdout
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Enable metrics
    #[arg(long)]
    metrics: bool,

    /// Metrics port
    #[arg(long)]
    metrics_port: Option<u16>,
}

impl Args {
    /// Flags given on the command line win over the config file.
    fn apply(&self, config: &mut NodeConfig) {
        if let Some(data_dir) = &self.data_dir {
            config.data_dir = data_dir.clone();
        }
        if self.rpc_external {
            config.rpc.http_addr.set_ip([0, 0, 0, 0].into());
        }
        if let Some(port) = self.rpc_port {
            config.rpc.http_addr.set_port(port);
        }
        if let Some(backend) = self.backend {
            config.storage.backend = backend;
        }
        if self.max_depth.is_some() {
            config.storage.max_depth = self.max_depth;
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if self.json_logs {
            config.logging.format = LogFormat::Json;
        }
        if self.log_file.is_some() {
            config.logging.log_file = self.log_file.clone();
        }
        if self.metrics {
            config.metrics.enabled = true;
        }
        if let Some(port) = self.metrics_port {
            config.metrics.addr.set_port(port);
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => NodeConfig::from_file(path)?,
        None => NodeConfig::default(),
    };
    args.apply(&mut config);

    telemetry::init(&config.logging)?;

    print_banner();

    match &args.config {
        Some(path) => info!("Loaded configuration from: {:?}", path),
        None => info!("Using default configuration"),
    }

    config.validate()?;

    info!("Configuration:");
    info!("  Name: {}", config.name);
    info!("  Data dir: {:?}", config.data_dir);
    info!("  Backend: {:?}", config.storage.backend);
    info!("  Max depth: {:?}", config.storage.max_depth);
    info!("  RPC addr: {}", config.rpc.http_addr);
    info!("  Metrics: {}", config.metrics.enabled);

    let (mut node, _shutdown) = node::KeyStackNode::new(config).await?;

    if let Err(e) = node.start().await {
        error!("Failed to start node: {}", e);
        return Err(e);
    }

    if let Err(e) = node.run().await {
        error!("Node error: {}", e);
        return Err(e);
    }

    info!("KeyStack node shutdown complete");
    Ok(())
}

/// Print startup banner.
fn print_banner() {
    println!();
    println!(r#"  _  __          ____  _             _    "#);
    println!(r#" | |/ /___ _   _/ ___|| |_ __ _  ___| | __"#);
    println!(r#" | ' // _ \ | | \___ \| __/ _` |/ __| |/ /"#);
    println!(r#" | . \  __/ |_| |___) | || (_| | (__|   < "#);
    println!(r#" |_|\_\___|\__, |____/ \__\__,_|\___|_|\_\"#);
    println!(r#"           |___/                          "#);
    println!();
    println!("                Version: {}", env!("CARGO_PKG_VERSION"));
    println!();
}
