//! Write overlay over a stack store.
//!
//! Reads check the overlay's buffers first and fall through to the base
//! store. Writes only touch the buffers. Dropping the overlay discards them,
//! `into_changeset` hands them over for the base store to apply.

use crate::{Changeset, ElementStore, LengthTable, StackStore, StorageError};
use keystack_types::{Felt, Identification, SlotKey};
use parking_lot::Mutex;
use std::collections::HashMap;

/// Write buffer layered on a base store.
pub struct Overlay<'a, S: StackStore + ?Sized> {
    base: &'a S,
    elements: Mutex<HashMap<SlotKey, Felt>>,
    lengths: Mutex<HashMap<Identification, u64>>,
}

impl<'a, S: StackStore + ?Sized> Overlay<'a, S> {
    pub fn new(base: &'a S) -> Self {
        Self {
            base,
            elements: Mutex::new(HashMap::new()),
            lengths: Mutex::new(HashMap::new()),
        }
    }

    /// Buffered writes, one per slot and per identification.
    pub fn into_changeset(self) -> Changeset {
        let mut changes = Changeset::new();
        for (slot, value) in self.elements.into_inner() {
            changes.set_element(slot.identification, slot.index, value);
        }
        for (identification, length) in self.lengths.into_inner() {
            changes.set_length(identification, length);
        }
        changes
    }
}

impl<S: StackStore + ?Sized> ElementStore for Overlay<'_, S> {
    fn get(&self, identification: Identification, index: u64) -> Result<Felt, StorageError> {
        if let Some(value) = self.elements.lock().get(&SlotKey::new(identification, index)) {
            return Ok(*value);
        }
        self.base.get(identification, index)
    }

    fn set(&self, identification: Identification, index: u64, value: Felt) -> Result<(), StorageError> {
        self.elements
            .lock()
            .insert(SlotKey::new(identification, index), value);
        Ok(())
    }
}

impl<S: StackStore + ?Sized> LengthTable for Overlay<'_, S> {
    fn get_length(&self, identification: Identification) -> Result<u64, StorageError> {
        if let Some(length) = self.lengths.lock().get(&identification) {
            return Ok(*length);
        }
        self.base.get_length(identification)
    }

    fn set_length(&self, identification: Identification, length: u64) -> Result<(), StorageError> {
        self.lengths.lock().insert(identification, length);
        Ok(())
    }
}

impl<S: StackStore + ?Sized> StackStore for Overlay<'_, S> {
    fn backend(&self) -> &'static str {
        self.base.backend()
    }

    fn apply(&self, changes: Changeset) -> Result<(), StorageError> {
        self.elements.lock().extend(changes.elements().iter().copied());
        self.lengths.lock().extend(changes.lengths().iter().copied());
        Ok(())
    }
}
