//! Node configuration.
//!
//! Handles loading and validation of node configuration from
//! config files and command-line arguments.

use keystack_core::EngineConfig;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Node configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Node name
    pub name: String,
    /// Data directory
    pub data_dir: PathBuf,
    /// RPC configuration
    pub rpc: RpcConfig,
    /// Storage configuration
    pub storage: StorageConfig,
    /// Metrics configuration
    pub metrics: MetricsConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            name: "keystack-node".to_string(),
            data_dir: PathBuf::from("./data"),
            rpc: RpcConfig::default(),
            storage: StorageConfig::default(),
            metrics: MetricsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

fn reject_traversal(path: &Path) -> anyhow::Result<()> {
    if path.to_string_lossy().contains("..") {
        anyhow::bail!("Invalid path: directory traversal detected");
    }
    Ok(())
}

impl NodeConfig {
    /// Load configuration from file.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        reject_traversal(path)?;

        let contents = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e))?;
        let config: NodeConfig = toml::from_str(&contents)
            .map_err(|e| anyhow::anyhow!("Failed to parse config file '{}': {}", path.display(), e))?;
        Ok(config)
    }

    /// Validate configuration.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.rpc.http_addr.port() == 0 {
            anyhow::bail!("RPC HTTP port cannot be 0");
        }

        if self.rpc.max_body_size == 0 {
            anyhow::bail!("RPC max body size cannot be 0");
        }

        if self.storage.max_depth == Some(0) {
            anyhow::bail!("Storage max_depth must be at least 1 when set");
        }

        if self.metrics.enabled {
            if self.metrics.addr.port() == 0 {
                anyhow::bail!("Metrics port cannot be 0");
            }
            if self.metrics.addr == self.rpc.http_addr {
                anyhow::bail!("Metrics and RPC cannot share {}", self.rpc.http_addr);
            }
        }

        if self.logging.level.trim().is_empty() {
            anyhow::bail!("Log level cannot be empty");
        }

        Ok(())
    }

    /// Directory the file backend keeps its data in.
    pub fn stacks_dir(&self) -> PathBuf {
        self.data_dir.join("stacks")
    }

    /// Engine settings derived from the storage section.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            max_depth: self.storage.max_depth,
        }
    }
}

/// RPC configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RpcConfig {
    /// HTTP RPC address
    pub http_addr: SocketAddr,
    /// Enable CORS
    pub cors: bool,
    /// Maximum request body size (bytes)
    pub max_body_size: usize,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            http_addr: SocketAddr::from(([127, 0, 0, 1], 8545)),
            cors: true,
            max_body_size: 1024 * 1024,
        }
    }
}

/// Stack storage backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Volatile, lost on restart
    Memory,
    /// Persisted under `data_dir`
    File,
}

/// Storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Per-stack element limit, unbounded when absent
    pub max_depth: Option<u64>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::File,
            max_depth: None,
        }
    }
}

/// Metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Enable metrics
    pub enabled: bool,
    /// Metrics server address
    pub addr: SocketAddr,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            addr: SocketAddr::from(([127, 0, 0, 1], 9090)),
        }
    }
}

/// Log line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable; multi-line on a terminal, single-line in a file
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directives, e.g. `info` or `keystack_core=debug`
    pub level: String,
    /// Append to this file instead of stdout
    pub log_file: Option<PathBuf>,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_file: None,
            format: LogFormat::Pretty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = NodeConfig::default();
        assert_eq!(config.name, "keystack-node");
        assert_eq!(config.storage.backend, StorageBackend::File);
        assert_eq!(config.storage.max_depth, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = NodeConfig::default();
        config.rpc.http_addr = SocketAddr::from(([127, 0, 0, 1], 0));
        assert!(config.validate().is_err());

        let mut config = NodeConfig::default();
        config.storage.max_depth = Some(0);
        assert!(config.validate().is_err());
        config.storage.max_depth = Some(1);
        assert!(config.validate().is_ok());

        let mut config = NodeConfig::default();
        config.metrics.enabled = true;
        config.metrics.addr = config.rpc.http_addr;
        assert!(config.validate().is_err());

        let mut config = NodeConfig::default();
        config.logging.level = " ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_log_format_parsing() {
        let config: NodeConfig = toml::from_str("[logging]\nformat = \"json\"\n").unwrap();
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.level, "info");

        let result: Result<NodeConfig, _> = toml::from_str("[logging]\nformat = \"xml\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_config_serialization() {
        let config = NodeConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();

        assert!(toml_str.contains("name"));
        assert!(toml_str.contains("keystack-node"));
        assert!(toml_str.contains("backend = \"file\""));
    }

    #[test]
    fn test_partial_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
name = "edge"

[storage]
backend = "memory"
max_depth = 64

[rpc]
http_addr = "0.0.0.0:9000"
"#
        )
        .unwrap();

        let config = NodeConfig::from_file(file.path()).unwrap();
        assert_eq!(config.name, "edge");
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.engine_config().max_depth, Some(64));
        assert_eq!(config.rpc.http_addr.port(), 9000);
        assert!(config.rpc.cors);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_traversal_rejected() {
        let err = NodeConfig::from_file(Path::new("../etc/node.toml")).unwrap_err();
        assert!(err.to_string().contains("traversal"));
        assert!(NodeConfig::from_file(Path::new("a/../b.toml")).is_err());
    }

    #[test]
    fn test_bad_backend() {
        let result: Result<NodeConfig, _> = toml::from_str("[storage]\nbackend = \"rocks\"\n");
        assert!(result.is_err());
    }
}
