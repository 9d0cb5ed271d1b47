//! KeyStack CLI - Command-line interface for a KeyStack node.

pub mod commands;
pub mod output;
pub mod rpc_client;

use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = commands::Cli::parse();

    if let Err(e) = commands::execute(cli).await {
        output::print_error(&format!("Error: {}", e));
        std::process::exit(1);
    }

    Ok(())
}
