//! RPC client for CLI operations.
//!
//! HTTP client for making JSON-RPC calls to a KeyStack node.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;

/// RPC client.
#[derive(Debug, Clone)]
pub struct RpcClient {
    url: String,
    client: reqwest::Client,
}

/// RPC request.
#[derive(Debug, Serialize)]
struct RpcRequest {
    jsonrpc: String,
    method: String,
    params: Value,
    id: u64,
}

/// RPC response.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct RpcResponse<T> {
    #[serde(default)]
    result: Option<T>,
    #[serde(default)]
    error: Option<RemoteError>,
}

/// Error reported by the node.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RemoteError {
    pub code: i32,
    pub message: String,
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RPC error {}: {}", self.code, self.message)
    }
}

impl std::error::Error for RemoteError {}

impl RpcClient {
    /// Create a new RPC client.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::new(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Make an RPC call.
    pub async fn call<T: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> anyhow::Result<T> {
        let request = RpcRequest {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
            id: 1,
        };

        let response = self.client.post(&self.url).json(&request).send().await?;

        let rpc_response: RpcResponse<T> = response.json().await?;

        if let Some(error) = rpc_response.error {
            return Err(error.into());
        }

        rpc_response
            .result
            .ok_or_else(|| anyhow::anyhow!("Empty result"))
    }

    // ============ Convenience Methods ============

    /// Dry-run a stack operation.
    pub async fn stack_call(&self, operation: &str, args: Value) -> anyhow::Result<Value> {
        self.call("stack_call", json!([operation, args])).await
    }

    /// Execute and commit a stack operation.
    pub async fn stack_invoke(&self, operation: &str, args: Value) -> anyhow::Result<Value> {
        self.call("stack_invoke", json!([operation, args])).await
    }

    pub async fn health(&self) -> anyhow::Result<Value> {
        self.call("keystack_health", json!([])).await
    }

    pub async fn version(&self) -> anyhow::Result<String> {
        self.call("keystack_version", json!([])).await
    }
}
