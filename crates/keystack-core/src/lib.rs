//! KeyStack Core - The stack engine.
//!
//! Implements push, pop, peek, empty and search over any
//! [`StackStore`](keystack_storage::StackStore), with per-identification
//! locking and call (dry run) vs invoke (commit) execution.

pub mod error;
pub mod config;
pub mod locks;
pub mod ops;
pub mod engine;

pub use error::StackError;
pub use config::EngineConfig;
pub use locks::LockTable;
pub use engine::{ExecutionMode, StackEngine};
