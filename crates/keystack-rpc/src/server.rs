//! JSON-RPC server over HTTP.
//!
//! Methods:
//! - `stack_call` `[operation, {args}]`: dry run, nothing is persisted
//! - `stack_invoke` `[operation, {args}]`: committed execution
//! - `keystack_version`
//! - `keystack_health`
//!
//! Bodies over `max_body_size` are refused with 413 before they are fully
//! read. Dispatch runs on the blocking pool since the file backend does
//! synchronous disk writes.

use crate::error::RpcError;
use crate::surface::AccessSurface;
use hyper::body::HttpBody;
use keystack_core::ExecutionMode;
use keystack_types::OperationKind;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Methods served by [`handle_method`].
pub const METHODS: [&str; 4] = ["stack_call", "stack_invoke", "keystack_version", "keystack_health"];

/// Label used for any method not in [`METHODS`].
pub const UNKNOWN_METHOD: &str = "unknown";

/// RPC configuration
#[derive(Debug, Clone)]
pub struct RpcServerConfig {
    pub http_addr: SocketAddr,
    pub cors: bool,
    /// Maximum request body size in bytes
    pub max_body_size: usize,
}

impl Default for RpcServerConfig {
    fn default() -> Self {
        Self {
            http_addr: SocketAddr::from(([127, 0, 0, 1], 8545)),
            cors: true,
            max_body_size: 1024 * 1024,
        }
    }
}

/// JSON-RPC Request
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: Vec<Value>,
    pub id: Option<Value>,
}

/// JSON-RPC Response
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
    pub id: Option<Value>,
}

/// JSON-RPC Error
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
}

impl JsonRpcResponse {
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: Some(result),
            error: None,
            id,
        }
    }

    pub fn failure(id: Option<Value>, error: RpcError) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: None,
            error: Some(JsonRpcError {
                code: error.code(),
                message: error.to_string(),
            }),
            id,
        }
    }
}

/// One handled request, as reported to a [`RequestObserver`].
#[derive(Debug, Clone)]
pub struct RequestRecord {
    /// One of [`METHODS`], or [`UNKNOWN_METHOD`]
    pub method: &'static str,
    /// Stack operation name for `stack_call` / `stack_invoke`
    pub operation: Option<&'static str>,
    pub mode: Option<ExecutionMode>,
    pub duration: Duration,
    pub error_code: Option<i32>,
}

/// Hook for request accounting (metrics).
pub trait RequestObserver: Send + Sync {
    fn observe(&self, record: &RequestRecord);
}

struct ServerContext {
    surface: AccessSurface,
    observer: Option<Arc<dyn RequestObserver>>,
    cors: bool,
    max_body_size: usize,
}

/// RPC Server
pub struct RpcServer {
    config: RpcServerConfig,
    surface: AccessSurface,
    observer: Option<Arc<dyn RequestObserver>>,
    local_addr: Option<SocketAddr>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl RpcServer {
    pub fn new(config: RpcServerConfig, surface: AccessSurface) -> Self {
        Self {
            config,
            surface,
            observer: None,
            local_addr: None,
            shutdown_tx: None,
            task: None,
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn RequestObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Bind and serve in the background. Returns the bound address.
    pub async fn start(&mut self) -> anyhow::Result<SocketAddr> {
        let ctx = Arc::new(ServerContext {
            surface: self.surface.clone(),
            observer: self.observer.clone(),
            cors: self.config.cors,
            max_body_size: self.config.max_body_size,
        });

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let server = hyper::Server::try_bind(&self.config.http_addr)?.serve(
            hyper::service::make_service_fn(move |_| {
                let ctx = ctx.clone();
                async move {
                    Ok::<_, hyper::Error>(hyper::service::service_fn(move |req| {
                        let ctx = ctx.clone();
                        async move { handle_rpc_request(req, ctx).await }
                    }))
                }
            }),
        );
        let local_addr = server.local_addr();

        let server = server.with_graceful_shutdown(async {
            let _ = shutdown_rx.await;
        });

        let task = tokio::spawn(async move {
            if let Err(e) = server.await {
                tracing::error!("RPC server error: {}", e);
            }
        });

        self.local_addr = Some(local_addr);
        self.shutdown_tx = Some(shutdown_tx);
        self.task = Some(task);

        tracing::info!(backend = self.surface.backend(), "KeyStack RPC server listening on {}", local_addr);
        Ok(local_addr)
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }

    /// Stop accepting connections and wait for in-flight requests.
    pub async fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!("RPC server task failed: {}", e);
            }
        }
        self.local_addr = None;
        tracing::info!("RPC server stopped");
    }
}

fn with_cors(builder: hyper::http::response::Builder, cors: bool) -> hyper::http::response::Builder {
    if cors {
        builder
            .header("Access-Control-Allow-Origin", "*")
            .header("Access-Control-Allow-Methods", "POST, OPTIONS")
            .header("Access-Control-Allow-Headers", "Content-Type, Authorization")
    } else {
        builder
    }
}

fn json_response(response: &JsonRpcResponse, cors: bool) -> hyper::Response<hyper::Body> {
    json_response_with_status(response, hyper::StatusCode::OK, cors)
}

fn json_response_with_status(
    response: &JsonRpcResponse,
    status: hyper::StatusCode,
    cors: bool,
) -> hyper::Response<hyper::Body> {
    let body = serde_json::to_string(response).unwrap_or_else(|_| {
        r#"{"jsonrpc":"2.0","error":{"code":-32603,"message":"Internal error"},"id":null}"#.to_string()
    });
    with_cors(hyper::Response::builder(), cors)
        .status(status)
        .header("Content-Type", "application/json")
        .body(hyper::Body::from(body))
        .unwrap_or_else(|_| hyper::Response::new(hyper::Body::from("Internal error")))
}

async fn handle_rpc_request(
    req: hyper::Request<hyper::Body>,
    ctx: Arc<ServerContext>,
) -> Result<hyper::Response<hyper::Body>, hyper::Error> {
    // CORS preflight
    if req.method() == hyper::Method::OPTIONS {
        return Ok(with_cors(hyper::Response::builder(), ctx.cors)
            .status(hyper::StatusCode::OK)
            .header("Access-Control-Max-Age", "86400")
            .body(hyper::Body::empty())
            .unwrap_or_else(|_| hyper::Response::new(hyper::Body::empty())));
    }

    if req.method() != hyper::Method::POST {
        return Ok(with_cors(hyper::Response::builder(), ctx.cors)
            .status(hyper::StatusCode::METHOD_NOT_ALLOWED)
            .body(hyper::Body::from("Only POST allowed"))
            .unwrap_or_else(|_| hyper::Response::new(hyper::Body::from("Error"))));
    }

    let started = Instant::now();

    let declared = req
        .headers()
        .get(hyper::header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());
    if let Some(length) = declared {
        if length > ctx.max_body_size as u64 {
            return Ok(body_too_large(length, &ctx));
        }
    }

    let body_bytes = match read_body(req.into_body(), ctx.max_body_size).await? {
        BodyRead::Complete(bytes) => bytes,
        BodyRead::TooLarge(seen) => return Ok(body_too_large(seen, &ctx)),
    };

    let rpc_req: JsonRpcRequest = match serde_json::from_slice(&body_bytes) {
        Ok(r) => r,
        Err(e) => {
            let error = RpcError::ParseError(e.to_string());
            return Ok(json_response(&JsonRpcResponse::failure(None, error), ctx.cors));
        }
    };

    let method = method_label(&rpc_req.method);
    let (operation, mode) = match method {
        "stack_call" => (operation_name(&rpc_req.params), Some(ExecutionMode::Call)),
        "stack_invoke" => (operation_name(&rpc_req.params), Some(ExecutionMode::Invoke)),
        _ => (None, None),
    };

    let id = rpc_req.id.clone();
    let surface = ctx.surface.clone();
    let response = match tokio::task::spawn_blocking(move || handle_method(&rpc_req, &surface)).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(method, "RPC dispatch failed: {}", e);
            JsonRpcResponse::failure(id, RpcError::InternalError("dispatch failed".to_string()))
        }
    };

    if let Some(observer) = &ctx.observer {
        observer.observe(&RequestRecord {
            method,
            operation,
            mode,
            duration: started.elapsed(),
            error_code: response.error.as_ref().map(|e| e.code),
        });
    }

    Ok(json_response(&response, ctx.cors))
}

enum BodyRead {
    Complete(Vec<u8>),
    /// Bytes seen when the limit was crossed
    TooLarge(u64),
}

/// Read a request body chunk by chunk, stopping once it passes `limit`.
async fn read_body(mut body: hyper::Body, limit: usize) -> Result<BodyRead, hyper::Error> {
    let hinted = body.size_hint().lower();
    if hinted > limit as u64 {
        return Ok(BodyRead::TooLarge(hinted));
    }

    let mut bytes = Vec::with_capacity(hinted as usize);
    while let Some(chunk) = body.data().await {
        let chunk = chunk?;
        if bytes.len() + chunk.len() > limit {
            return Ok(BodyRead::TooLarge((bytes.len() + chunk.len()) as u64));
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(BodyRead::Complete(bytes))
}

fn body_too_large(length: u64, ctx: &ServerContext) -> hyper::Response<hyper::Body> {
    tracing::debug!(length, limit = ctx.max_body_size, "Rejected oversized request body");
    let error = RpcError::InvalidRequest(format!(
        "body of at least {} bytes exceeds limit of {}",
        length, ctx.max_body_size
    ));
    json_response_with_status(
        &JsonRpcResponse::failure(None, error),
        hyper::StatusCode::PAYLOAD_TOO_LARGE,
        ctx.cors,
    )
}

/// Bounded label for a method name.
pub fn method_label(method: &str) -> &'static str {
    METHODS
        .iter()
        .copied()
        .find(|known| *known == method)
        .unwrap_or(UNKNOWN_METHOD)
}

/// Operation name of a stack request, when it names a known operation.
fn operation_name(params: &[Value]) -> Option<&'static str> {
    params
        .first()
        .and_then(|v| v.as_str())
        .and_then(|name| name.parse::<OperationKind>().ok())
        .map(|kind| kind.name())
}

/// Dispatch one decoded request.
pub fn handle_method(req: &JsonRpcRequest, surface: &AccessSurface) -> JsonRpcResponse {
    if req.jsonrpc != "2.0" {
        return JsonRpcResponse::failure(
            req.id.clone(),
            RpcError::InvalidRequest(format!("unsupported jsonrpc version '{}'", req.jsonrpc)),
        );
    }

    let result = match req.method.as_str() {
        "stack_call" => stack_method(req, surface, ExecutionMode::Call),
        "stack_invoke" => stack_method(req, surface, ExecutionMode::Invoke),
        "keystack_version" => Ok(Value::String(env!("CARGO_PKG_VERSION").to_string())),
        "keystack_health" => Ok(json!({
            "status": "ok",
            "backend": surface.backend(),
        })),
        other => Err(RpcError::MethodNotFound(other.to_string())),
    };

    match result {
        Ok(value) => JsonRpcResponse::success(req.id.clone(), value),
        Err(e) => JsonRpcResponse::failure(req.id.clone(), e),
    }
}

fn stack_method(
    req: &JsonRpcRequest,
    surface: &AccessSurface,
    mode: ExecutionMode,
) -> Result<Value, RpcError> {
    let operation = req
        .params
        .first()
        .and_then(|v| v.as_str())
        .ok_or_else(|| RpcError::InvalidParams("expected [operation, {args}]".to_string()))?;
    let empty_args = json!({});
    let args = req.params.get(1).unwrap_or(&empty_args);

    surface
        .dispatch(operation, args, mode)
        .map_err(|e| {
            tracing::debug!(method = %req.method, operation, error = %e, "stack request failed");
            RpcError::from(e)
        })
}
