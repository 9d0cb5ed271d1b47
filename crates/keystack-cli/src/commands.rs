//! CLI command implementations.

use clap::{Args, Parser, Subcommand};
use keystack_rpc::felt_to_json;
use keystack_types::{Felt, Identification, OperationKind};
use serde_json::{json, Value};

use crate::output::*;
use crate::rpc_client::RpcClient;

/// Default node endpoint.
pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8545";

/// Main CLI.
#[derive(Parser, Debug)]
#[command(name = "keystack")]
#[command(about = "KeyStack CLI - drive keyed stacks on a KeyStack node")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// RPC endpoint URL
    #[arg(short, long, global = true, env = "KEYSTACK_RPC")]
    pub rpc: Option<String>,

    /// Single-line JSON output
    #[arg(long, global = true)]
    pub compact: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run an operation without committing it
    Call(StackArgs),
    /// Run an operation and commit it
    Invoke(StackArgs),
    /// Check node health
    Health,
    /// Show node version
    Version,
}

/// Arguments shared by `call` and `invoke`.
#[derive(Args, Debug, Clone)]
pub struct StackArgs {
    /// Operation: empty, push, pop, peek or search
    pub operation: OperationKind,

    /// Stack identification
    #[arg(short, long)]
    pub id: Identification,

    /// Value for push or search
    #[arg(short, long, allow_hyphen_values = true)]
    pub value: Option<Felt>,
}

impl StackArgs {
    /// Named arguments as the node expects them.
    pub fn to_params(&self) -> anyhow::Result<Value> {
        let value_name = match self.operation {
            OperationKind::Push => Some("valueToPush"),
            OperationKind::Search => Some("valueToSearch"),
            _ => None,
        };

        match (value_name, self.value) {
            (Some(name), Some(value)) => Ok(json!({
                "identification": self.id.value(),
                name: felt_to_json(value),
            })),
            (Some(_), None) => anyhow::bail!("{} requires --value", self.operation),
            (None, Some(_)) => anyhow::bail!("{} does not take --value", self.operation),
            (None, None) => Ok(json!({ "identification": self.id.value() })),
        }
    }
}

/// Execute a parsed command.
pub async fn execute(cli: Cli) -> anyhow::Result<()> {
    let client = RpcClient::new(cli.rpc.unwrap_or_else(|| DEFAULT_RPC_URL.to_string()));

    match cli.command {
        Commands::Call(args) => {
            let params = args.to_params()?;
            let result = client.stack_call(args.operation.name(), params).await?;
            print_json(&result, cli.compact);
        }
        Commands::Invoke(args) => {
            let params = args.to_params()?;
            let result = client.stack_invoke(args.operation.name(), params).await?;
            print_json(&result, cli.compact);
        }
        Commands::Health => {
            let health = client.health().await?;
            if cli.compact {
                print_json(&health, true);
            } else {
                print_success(&format!("Node at {} is healthy", client.url()));
                if let Some(backend) = health.get("backend").and_then(|b| b.as_str()) {
                    print_kv("Backend", backend);
                }
            }
        }
        Commands::Version => {
            let version = client.version().await?;
            print_info(&format!("KeyStack node {}", version));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    fn stack_args(cli: Cli) -> StackArgs {
        match cli.command {
            Commands::Call(a) | Commands::Invoke(a) => a,
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_invoke_push() {
        let cli = parse(&["keystack", "invoke", "push", "--id", "2", "--value", "42"]);
        let args = stack_args(cli);
        assert_eq!(args.operation, OperationKind::Push);
        assert_eq!(
            args.to_params().unwrap(),
            json!({ "identification": 2, "valueToPush": 42 })
        );
    }

    #[test]
    fn test_parse_negative_and_hex() {
        let cli = parse(&["keystack", "call", "search", "--id", "0x10", "--value", "-20"]);
        let args = stack_args(cli);
        assert_eq!(args.id, Identification::new(16));
        assert_eq!(
            args.to_params().unwrap(),
            json!({ "identification": 16, "valueToSearch": -20 })
        );
    }

    #[test]
    fn test_value_rules() {
        let args = stack_args(parse(&["keystack", "invoke", "push", "--id", "1"]));
        assert!(args.to_params().unwrap_err().to_string().contains("requires --value"));

        let args = stack_args(parse(&["keystack", "call", "pop", "--id", "1", "--value", "3"]));
        assert!(args.to_params().is_err());

        let args = stack_args(parse(&["keystack", "call", "empty", "--id", "1"]));
        assert_eq!(args.to_params().unwrap(), json!({ "identification": 1 }));
    }

    #[test]
    fn test_rejects_unknown_operation() {
        assert!(Cli::try_parse_from(["keystack", "call", "drop", "--id", "1"]).is_err());
        assert!(Cli::try_parse_from(["keystack", "call", "pop"]).is_err());
    }

    #[test]
    fn test_global_flags() {
        let cli = parse(&["keystack", "health", "--rpc", "http://node:8545", "--compact"]);
        assert_eq!(cli.rpc.as_deref(), Some("http://node:8545"));
        assert!(cli.compact);
        assert!(matches!(cli.command, Commands::Health));
    }
}
