//! Service node: storage backend, engine, RPC server and metrics.

use keystack_core::StackEngine;
use keystack_rpc::{AccessSurface, RpcServer, RpcServerConfig};
use keystack_storage::{FileStore, MemoryStore};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::config::{NodeConfig, StorageBackend};
use crate::metrics::{Metrics, MetricsServer};

/// Node state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    /// Initializing
    Initializing,
    /// Running normally
    Running,
    /// Shutting down
    ShuttingDown,
    /// Stopped
    Stopped,
}

impl NodeState {
    /// Check if node is active.
    pub fn is_active(&self) -> bool {
        matches!(self, NodeState::Running)
    }
}

/// The KeyStack service node.
pub struct KeyStackNode {
    /// Node configuration
    pub config: NodeConfig,
    /// Current state
    pub node_state: Arc<RwLock<NodeState>>,
    /// Access surface over the configured backend
    surface: AccessSurface,
    metrics: Option<Arc<Metrics>>,
    metrics_task: Option<JoinHandle<()>>,
    rpc_server: Option<RpcServer>,
    /// Shutdown signal
    shutdown: mpsc::Receiver<()>,
}

/// Build the access surface for the configured backend.
pub fn build_surface(config: &NodeConfig) -> anyhow::Result<AccessSurface> {
    let engine_config = config.engine_config();
    let surface = match config.storage.backend {
        StorageBackend::Memory => {
            AccessSurface::from_engine(StackEngine::with_config(MemoryStore::new(), engine_config))
        }
        StorageBackend::File => {
            let store = FileStore::open(&config.stacks_dir())?;
            AccessSurface::from_engine(StackEngine::with_config(store, engine_config))
        }
    };
    Ok(surface)
}

impl KeyStackNode {
    /// Create a new node.
    pub async fn new(config: NodeConfig) -> anyhow::Result<(Self, mpsc::Sender<()>)> {
        info!("Initializing KeyStack node: {}", config.name);

        let surface = build_surface(&config)?;
        let metrics = if config.metrics.enabled {
            Some(Metrics::new()?)
        } else {
            None
        };

        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let node = Self {
            config,
            node_state: Arc::new(RwLock::new(NodeState::Initializing)),
            surface,
            metrics,
            metrics_task: None,
            rpc_server: None,
            shutdown: shutdown_rx,
        };

        Ok((node, shutdown_tx))
    }

    /// Start the node.
    pub async fn start(&mut self) -> anyhow::Result<()> {
        info!(
            backend = self.surface.backend(),
            max_depth = ?self.config.storage.max_depth,
            "Starting KeyStack node"
        );

        if let Some(metrics) = &self.metrics {
            let server = MetricsServer::new(self.config.metrics.addr, metrics.clone());
            self.metrics_task = Some(tokio::spawn(async move {
                if let Err(e) = server.start().await {
                    warn!("Metrics server error: {}", e);
                }
            }));
        }

        self.start_rpc().await?;

        *self.node_state.write().await = NodeState::Running;
        info!("KeyStack node started successfully");

        Ok(())
    }

    /// Start the RPC server.
    async fn start_rpc(&mut self) -> anyhow::Result<()> {
        let rpc_config = RpcServerConfig {
            http_addr: self.config.rpc.http_addr,
            cors: self.config.rpc.cors,
            max_body_size: self.config.rpc.max_body_size,
        };

        let mut rpc_server = RpcServer::new(rpc_config, self.surface.clone());
        if let Some(metrics) = &self.metrics {
            rpc_server = rpc_server.with_observer(metrics.clone());
        }
        rpc_server.start().await?;

        self.rpc_server = Some(rpc_server);
        Ok(())
    }

    /// Run the node (main loop).
    pub async fn run(&mut self) -> anyhow::Result<()> {
        info!("Node is running. Press Ctrl+C to shutdown.");

        tokio::select! {
            _ = self.shutdown.recv() => {
                info!("Shutdown signal received");
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Ctrl+C received");
            }
        }

        self.shutdown().await;
        Ok(())
    }

    /// Graceful shutdown.
    pub async fn shutdown(&mut self) {
        info!("Shutting down KeyStack node...");
        *self.node_state.write().await = NodeState::ShuttingDown;

        if let Some(mut rpc) = self.rpc_server.take() {
            rpc.stop().await;
        }

        if let Some(task) = self.metrics_task.take() {
            task.abort();
        }

        *self.node_state.write().await = NodeState::Stopped;
        info!("KeyStack node stopped");
    }

    /// Bound RPC address once started.
    pub fn rpc_addr(&self) -> Option<SocketAddr> {
        self.rpc_server.as_ref().and_then(|s| s.local_addr())
    }

    pub fn surface(&self) -> &AccessSurface {
        &self.surface
    }

    pub fn metrics(&self) -> Option<&Arc<Metrics>> {
        self.metrics.as_ref()
    }

    /// Get node state.
    pub async fn state(&self) -> NodeState {
        *self.node_state.read().await
    }

    /// Check if node is healthy.
    pub async fn is_healthy(&self) -> bool {
        self.state().await.is_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_config(backend: StorageBackend, data_dir: &std::path::Path) -> NodeConfig {
        let mut config = NodeConfig::default();
        config.data_dir = data_dir.to_path_buf();
        config.storage.backend = backend;
        config.rpc.http_addr = SocketAddr::from(([127, 0, 0, 1], 0));
        config
    }

    #[tokio::test]
    async fn test_node_creation() {
        let dir = tempfile::tempdir().unwrap();
        let (node, _shutdown) = KeyStackNode::new(test_config(StorageBackend::Memory, dir.path()))
            .await
            .unwrap();

        assert_eq!(node.state().await, NodeState::Initializing);
        assert_eq!(node.surface().backend(), "memory");
        assert!(node.metrics().is_none());
        assert!(node.rpc_addr().is_none());
    }

    #[tokio::test]
    async fn test_node_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let (mut node, shutdown) = KeyStackNode::new(test_config(StorageBackend::Memory, dir.path()))
            .await
            .unwrap();

        node.start().await.unwrap();
        assert!(node.is_healthy().await);
        assert!(node.rpc_addr().is_some());

        shutdown.send(()).await.unwrap();
        node.run().await.unwrap();
        assert_eq!(node.state().await, NodeState::Stopped);
        assert!(node.rpc_addr().is_none());
    }

    #[tokio::test]
    async fn test_file_backend_restores_stacks() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(StorageBackend::File, dir.path());

        {
            let surface = build_surface(&config).unwrap();
            assert_eq!(surface.backend(), "file");
            surface
                .invoke("push", &json!({ "identification": 3, "valueToPush": 77 }))
                .unwrap();
        }

        let (node, _shutdown) = KeyStackNode::new(config).await.unwrap();
        let out = node.surface().call("peek", &json!({ "identification": 3 })).unwrap();
        assert_eq!(out, json!({ "peekedValue": 77 }));
        assert!(dir.path().join("stacks").exists());
    }

    #[tokio::test]
    async fn test_max_depth_applies() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config(StorageBackend::Memory, dir.path());
        config.storage.max_depth = Some(1);

        let surface = build_surface(&config).unwrap();
        let args = json!({ "identification": 1, "valueToPush": 5 });
        surface.invoke("push", &args).unwrap();
        let err = surface.invoke("push", &args).unwrap_err();
        assert!(err.to_string().contains("Stack full"));
    }

    #[test]
    fn test_node_state_is_active() {
        assert!(NodeState::Running.is_active());
        assert!(!NodeState::Stopped.is_active());
        assert!(!NodeState::Initializing.is_active());
    }
}
