//! Stack operations over a store.
//!
//! These functions hold no locks. Callers serialize access per
//! identification (see [`crate::engine::StackEngine`]).

use crate::config::EngineConfig;
use crate::error::StackError;
use keystack_storage::StackStore;
use keystack_types::{Felt, Identification, Operation, Outcome};

/// True iff the stack holds no live element.
pub fn empty<S: StackStore + ?Sized>(store: &S, id: Identification) -> Result<bool, StackError> {
    Ok(store.get_length(id)? == 0)
}

/// Write `value` at slot `length`, then bump the length.
///
/// The element is written before the length so an interrupted push leaves
/// only a stale slot behind.
pub fn push<S: StackStore + ?Sized>(
    store: &S,
    id: Identification,
    value: Felt,
    config: &EngineConfig,
) -> Result<u64, StackError> {
    let length = store.get_length(id)?;

    if let Some(limit) = config.max_depth {
        if length >= limit {
            return Err(StackError::StackFull { limit });
        }
    }
    let new_length = length
        .checked_add(1)
        .ok_or(StackError::StackFull { limit: u64::MAX })?;

    store.set(id, length, value)?;
    store.set_length(id, new_length)?;
    Ok(new_length)
}

/// Remove and return the top. The slot keeps its value; only the length drops.
pub fn pop<S: StackStore + ?Sized>(store: &S, id: Identification) -> Result<Felt, StackError> {
    let length = store.get_length(id)?;
    if length == 0 {
        return Err(StackError::StackEmpty);
    }

    let value = store.get(id, length - 1)?;
    store.set_length(id, length - 1)?;
    Ok(value)
}

/// Return the top without removing it.
pub fn peek<S: StackStore + ?Sized>(store: &S, id: Identification) -> Result<Felt, StackError> {
    let length = store.get_length(id)?;
    if length == 0 {
        return Err(StackError::StackEmpty);
    }

    Ok(store.get(id, length - 1)?)
}

/// Membership test over the live slots. An empty stack contains nothing.
pub fn search<S: StackStore + ?Sized>(
    store: &S,
    id: Identification,
    target: Felt,
) -> Result<bool, StackError> {
    let length = store.get_length(id)?;

    // Top first
    for index in (0..length).rev() {
        if store.get(id, index)? == target {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Run one operation against `store`.
pub fn execute<S: StackStore + ?Sized>(
    store: &S,
    id: Identification,
    operation: Operation,
    config: &EngineConfig,
) -> Result<Outcome, StackError> {
    match operation {
        Operation::Empty => empty(store, id).map(Outcome::IsEmpty),
        Operation::Push(value) => push(store, id, value, config).map(|_| Outcome::Pushed),
        Operation::Pop => pop(store, id).map(Outcome::Popped),
        Operation::Peek => peek(store, id).map(Outcome::Peeked),
        Operation::Search(target) => search(store, id, target).map(Outcome::Contains),
    }
}
