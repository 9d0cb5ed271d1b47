//! KeyStack RPC - Access surface and JSON-RPC server.
//!
//! The access surface maps named operations and named arguments
//! (`identification`, `valueToPush`, `valueToSearch`) onto the stack
//! engine, in either call (dry run) or invoke (commit) mode. The server
//! exposes it over HTTP as `stack_call` / `stack_invoke`.

pub mod error;
pub mod surface;
pub mod server;

pub use error::{error_codes, RpcError, SurfaceError};
pub use surface::{felt_to_json, outcome_to_json, parse_operation, AccessSurface, StackService};
pub use server::{
    handle_method, method_label, JsonRpcError, JsonRpcRequest, JsonRpcResponse, RequestObserver,
    RequestRecord, RpcServer, RpcServerConfig, METHODS, UNKNOWN_METHOD,
};
