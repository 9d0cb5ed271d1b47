//! KeyStack Storage - Element store and length table backends.
//!
//! Two abstract durable maps back every stack instance:
//! - the element store, `(identification, index) -> Felt`
//! - the length table, `identification -> u64`
//!
//! Backends implement both. `MemoryStore` keeps them in process memory,
//! `FileStore` persists them in a JSON column file, and `Overlay` buffers
//! writes over any backend. A buffered [`Changeset`] is either dropped or
//! applied to the backend as one unit.

pub mod error;
pub mod changeset;
pub mod db;
pub mod memory;
pub mod file_store;
pub mod overlay;

pub use error::StorageError;
pub use changeset::Changeset;
pub use db::{Column, Database, WriteBatch};
pub use memory::MemoryStore;
pub use file_store::FileStore;
pub use overlay::Overlay;

use keystack_types::{Felt, Identification};
use std::sync::Arc;

/// Durable map from `(identification, index)` to element value.
pub trait ElementStore {
    /// Value at the slot, or `Felt::ZERO` if it was never written.
    fn get(&self, identification: Identification, index: u64) -> Result<Felt, StorageError>;

    /// Overwrite the slot.
    fn set(&self, identification: Identification, index: u64, value: Felt) -> Result<(), StorageError>;
}

/// Durable map from identification to current stack length.
pub trait LengthTable {
    /// Current length, 0 for identifications never written.
    fn get_length(&self, identification: Identification) -> Result<u64, StorageError>;

    /// Overwrite the length.
    fn set_length(&self, identification: Identification, length: u64) -> Result<(), StorageError>;
}

/// A backend holding both maps of a stack store.
pub trait StackStore: ElementStore + LengthTable {
    /// Short backend name for logs and health output
    fn backend(&self) -> &'static str;

    /// Apply every write in `changes`, or none of them on error.
    fn apply(&self, changes: Changeset) -> Result<(), StorageError>;
}

impl<T: ElementStore + ?Sized> ElementStore for &T {
    fn get(&self, identification: Identification, index: u64) -> Result<Felt, StorageError> {
        (**self).get(identification, index)
    }

    fn set(&self, identification: Identification, index: u64, value: Felt) -> Result<(), StorageError> {
        (**self).set(identification, index, value)
    }
}

impl<T: LengthTable + ?Sized> LengthTable for &T {
    fn get_length(&self, identification: Identification) -> Result<u64, StorageError> {
        (**self).get_length(identification)
    }

    fn set_length(&self, identification: Identification, length: u64) -> Result<(), StorageError> {
        (**self).set_length(identification, length)
    }
}

impl<T: StackStore + ?Sized> StackStore for &T {
    fn backend(&self) -> &'static str {
        (**self).backend()
    }

    fn apply(&self, changes: Changeset) -> Result<(), StorageError> {
        (**self).apply(changes)
    }
}

impl<T: ElementStore + ?Sized> ElementStore for Arc<T> {
    fn get(&self, identification: Identification, index: u64) -> Result<Felt, StorageError> {
        (**self).get(identification, index)
    }

    fn set(&self, identification: Identification, index: u64, value: Felt) -> Result<(), StorageError> {
        (**self).set(identification, index, value)
    }
}

impl<T: LengthTable + ?Sized> LengthTable for Arc<T> {
    fn get_length(&self, identification: Identification) -> Result<u64, StorageError> {
        (**self).get_length(identification)
    }

    fn set_length(&self, identification: Identification, length: u64) -> Result<(), StorageError> {
        (**self).set_length(identification, length)
    }
}

impl<T: StackStore + ?Sized> StackStore for Arc<T> {
    fn backend(&self) -> &'static str {
        (**self).backend()
    }

    fn apply(&self, changes: Changeset) -> Result<(), StorageError> {
        (**self).apply(changes)
    }
}
