//! Metrics collection and reporting.
//!
//! Uses Prometheus for metrics collection and exposition.

use keystack_rpc::{RequestObserver, RequestRecord};
use prometheus::{Encoder, Histogram, IntCounterVec, Opts, Registry, TextEncoder};
use std::sync::Arc;

/// Metrics collector.
pub struct Metrics {
    /// Prometheus registry
    registry: Registry,
    /// RPC requests by method
    pub rpc_requests: IntCounterVec,
    /// Stack operations by operation and mode
    pub stack_operations: IntCounterVec,
    /// Failed requests by JSON-RPC error code
    pub rpc_errors: IntCounterVec,
    /// RPC request duration
    pub rpc_request_duration: Histogram,
}

impl Metrics {
    /// Create new metrics collector.
    pub fn new() -> anyhow::Result<Arc<Self>> {
        let registry = Registry::new();

        let rpc_requests = IntCounterVec::new(
            Opts::new("keystack_rpc_requests_total", "Total number of RPC requests"),
            &["method"],
        )?;
        registry.register(Box::new(rpc_requests.clone()))?;

        let stack_operations = IntCounterVec::new(
            Opts::new(
                "keystack_stack_operations_total",
                "Stack operations executed, by operation and mode",
            ),
            &["operation", "mode"],
        )?;
        registry.register(Box::new(stack_operations.clone()))?;

        let rpc_errors = IntCounterVec::new(
            Opts::new("keystack_rpc_errors_total", "Failed RPC requests by error code"),
            &["code"],
        )?;
        registry.register(Box::new(rpc_errors.clone()))?;

        let rpc_request_duration = Histogram::with_opts(
            prometheus::HistogramOpts::new(
                "keystack_rpc_request_duration_seconds",
                "RPC request duration",
            )
            .buckets(vec![0.0001, 0.001, 0.01, 0.1, 0.5, 1.0]),
        )?;
        registry.register(Box::new(rpc_request_duration.clone()))?;

        Ok(Arc::new(Self {
            registry,
            rpc_requests,
            stack_operations,
            rpc_errors,
            rpc_request_duration,
        }))
    }

    /// Export metrics in Prometheus text format.
    pub fn export(&self) -> anyhow::Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }

    /// Record RPC request.
    pub fn record_rpc_request(&self, record: &RequestRecord) {
        self.rpc_requests.with_label_values(&[record.method]).inc();
        self.rpc_request_duration.observe(record.duration.as_secs_f64());

        if let (Some(operation), Some(mode)) = (record.operation, record.mode) {
            self.stack_operations
                .with_label_values(&[operation, mode.name()])
                .inc();
        }

        if let Some(code) = record.error_code {
            self.rpc_errors.with_label_values(&[&code.to_string()]).inc();
        }
    }
}

impl RequestObserver for Metrics {
    fn observe(&self, record: &RequestRecord) {
        self.record_rpc_request(record);
    }
}

/// Metrics server.
pub struct MetricsServer {
    addr: std::net::SocketAddr,
    metrics: Arc<Metrics>,
}

impl MetricsServer {
    /// Create new metrics server.
    pub fn new(addr: std::net::SocketAddr, metrics: Arc<Metrics>) -> Self {
        Self { addr, metrics }
    }

    fn router(&self) -> axum::Router {
        let metrics = self.metrics.clone();
        axum::Router::new().route(
            "/metrics",
            axum::routing::get(move || {
                let metrics = metrics.clone();
                async move {
                    match metrics.export() {
                        Ok(output) => (axum::http::StatusCode::OK, output),
                        Err(_) => (axum::http::StatusCode::INTERNAL_SERVER_ERROR, "Error".to_string()),
                    }
                }
            }),
        )
    }

    /// Start the metrics server.
    pub async fn start(&self) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        tracing::info!("Metrics server listening on {}", listener.local_addr()?);
        axum::serve(listener, self.router()).await?;

        Ok(())
    }
}
