//! Stack engine.
//!
//! Wraps a [`StackStore`] with per-identification locking. Every operation
//! holds the identification's lock for its whole read-check-write sequence,
//! which makes operations on one identification linearizable.
//!
//! Operations run against an [`Overlay`]. A committed operation hands the
//! overlay's writes to the store in one `apply`, so a failed write leaves
//! the stack as it was.

use crate::config::EngineConfig;
use crate::error::StackError;
use crate::locks::LockTable;
use crate::ops;
use keystack_storage::{Overlay, StackStore};
use keystack_types::{Felt, Identification, Operation, Outcome};
use std::fmt;
use tracing::debug;

/// How an operation's effects are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// Dry run: effects are computed and then discarded
    Call,
    /// Effects are persisted before success is returned
    Invoke,
}

impl ExecutionMode {
    pub fn name(&self) -> &'static str {
        match self {
            ExecutionMode::Call => "call",
            ExecutionMode::Invoke => "invoke",
        }
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Keyed LIFO stack engine.
pub struct StackEngine<S> {
    store: S,
    locks: LockTable,
    config: EngineConfig,
}

impl<S: StackStore> StackEngine<S> {
    /// Create an unbounded engine over `store`.
    pub fn new(store: S) -> Self {
        Self::with_config(store, EngineConfig::default())
    }

    pub fn with_config(store: S, config: EngineConfig) -> Self {
        Self {
            store,
            locks: LockTable::new(),
            config,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Current number of live elements.
    pub fn length(&self, id: Identification) -> Result<u64, StackError> {
        self.locks
            .with_lock(id, || self.store.get_length(id).map_err(StackError::from))
    }

    pub fn empty(&self, id: Identification) -> Result<bool, StackError> {
        self.locks.with_lock(id, || ops::empty(&self.store, id))
    }

    pub fn push(&self, id: Identification, value: Felt) -> Result<(), StackError> {
        self.locks.with_lock(id, || {
            let length = self.commit(|store| ops::push(store, id, value, &self.config))?;
            debug!(identification = %id, value = %value, length, "push");
            Ok(())
        })
    }

    pub fn pop(&self, id: Identification) -> Result<Felt, StackError> {
        self.locks.with_lock(id, || {
            let value = self.commit(|store| ops::pop(store, id))?;
            debug!(identification = %id, value = %value, "pop");
            Ok(value)
        })
    }

    pub fn peek(&self, id: Identification) -> Result<Felt, StackError> {
        self.locks.with_lock(id, || ops::peek(&self.store, id))
    }

    pub fn search(&self, id: Identification, target: Felt) -> Result<bool, StackError> {
        self.locks.with_lock(id, || ops::search(&self.store, id, target))
    }

    /// Run `operation` and persist its effects.
    pub fn invoke(&self, id: Identification, operation: Operation) -> Result<Outcome, StackError> {
        self.execute(id, operation, ExecutionMode::Invoke)
    }

    /// Run `operation` against a throwaway overlay and report what it would return.
    pub fn call(&self, id: Identification, operation: Operation) -> Result<Outcome, StackError> {
        self.execute(id, operation, ExecutionMode::Call)
    }

    pub fn execute(
        &self,
        id: Identification,
        operation: Operation,
        mode: ExecutionMode,
    ) -> Result<Outcome, StackError> {
        self.locks.with_lock(id, || {
            let result = match mode {
                ExecutionMode::Invoke => {
                    self.commit(|store| ops::execute(store, id, operation, &self.config))
                }
                ExecutionMode::Call => {
                    let overlay = Overlay::new(&self.store);
                    ops::execute(&overlay, id, operation, &self.config)
                }
            };

            match &result {
                Ok(outcome) => {
                    debug!(identification = %id, %operation, %mode, ?outcome, "executed")
                }
                Err(e) => debug!(identification = %id, %operation, %mode, error = %e, "rejected"),
            }
            result
        })
    }

    /// Run `f` over an overlay and apply its writes if it succeeds.
    /// Caller holds the identification's lock.
    fn commit<T>(
        &self,
        f: impl FnOnce(&Overlay<'_, S>) -> Result<T, StackError>,
    ) -> Result<T, StackError> {
        let overlay = Overlay::new(&self.store);
        let value = f(&overlay)?;
        self.store
            .apply(overlay.into_changeset())
            .map_err(StackError::from)?;
        Ok(value)
    }
}
