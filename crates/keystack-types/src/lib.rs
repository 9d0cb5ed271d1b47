//! KeyStack Types - Core type definitions shared by every KeyStack crate.
//!
//! This crate provides:
//! - `Identification`, the caller-chosen key of one stack instance
//! - `Felt`, the fixed-width integer stored in stack slots
//! - `SlotKey`, the `(identification, index)` address of one element
//! - `Operation` / `Outcome`, the five stack operations and their results

pub mod identification;
pub mod felt;
pub mod slot;
pub mod operation;
pub mod error;

#[cfg(feature = "serde")]
mod serialization;

pub use identification::Identification;
pub use felt::Felt;
pub use slot::SlotKey;
pub use operation::{Operation, OperationKind, Outcome};
pub use error::TypesError;
