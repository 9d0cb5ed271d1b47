//! RPC error types.

use keystack_core::StackError;
use keystack_types::TypesError;
use thiserror::Error;

/// JSON-RPC error codes.
pub mod error_codes {
    /// Parse error
    pub const PARSE_ERROR: i32 = -32700;
    /// Invalid request
    pub const INVALID_REQUEST: i32 = -32600;
    /// Method not found
    pub const METHOD_NOT_FOUND: i32 = -32601;
    /// Invalid params
    pub const INVALID_PARAMS: i32 = -32602;
    /// Internal error
    pub const INTERNAL_ERROR: i32 = -32603;
    /// Operation rejected by the stack (underflow, capacity)
    pub const EXECUTION_ERROR: i32 = -32000;
}

/// Errors raised by the access surface.
#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Stack(#[from] StackError),
}

impl From<TypesError> for SurfaceError {
    fn from(e: TypesError) -> Self {
        match e {
            TypesError::UnknownOperation(name) => SurfaceError::UnknownOperation(name),
            other => SurfaceError::InvalidArgument(other.to_string()),
        }
    }
}

impl SurfaceError {
    /// JSON-RPC error code for this error.
    pub fn code(&self) -> i32 {
        match self {
            SurfaceError::UnknownOperation(_) | SurfaceError::InvalidArgument(_) => {
                error_codes::INVALID_PARAMS
            }
            SurfaceError::Stack(e) if e.is_rejection() => error_codes::EXECUTION_ERROR,
            SurfaceError::Stack(_) => error_codes::INTERNAL_ERROR,
        }
    }
}

/// Errors returned to JSON-RPC clients.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RpcError {
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Method not found: {0}")]
    MethodNotFound(String),

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    /// Message is passed through verbatim so clients can match on it
    #[error("{0}")]
    ExecutionError(String),
}

impl RpcError {
    /// Get the error code.
    pub fn code(&self) -> i32 {
        match self {
            RpcError::ParseError(_) => error_codes::PARSE_ERROR,
            RpcError::InvalidRequest(_) => error_codes::INVALID_REQUEST,
            RpcError::MethodNotFound(_) => error_codes::METHOD_NOT_FOUND,
            RpcError::InvalidParams(_) => error_codes::INVALID_PARAMS,
            RpcError::InternalError(_) => error_codes::INTERNAL_ERROR,
            RpcError::ExecutionError(_) => error_codes::EXECUTION_ERROR,
        }
    }
}

impl From<SurfaceError> for RpcError {
    fn from(e: SurfaceError) -> Self {
        match e.code() {
            error_codes::INVALID_PARAMS => RpcError::InvalidParams(e.to_string()),
            error_codes::EXECUTION_ERROR => RpcError::ExecutionError(e.to_string()),
            _ => RpcError::InternalError(e.to_string()),
        }
    }
}
