//! Writes produced by one stack operation.

use keystack_types::{Felt, Identification, SlotKey};

/// Element and length writes that a store applies as one unit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Changeset {
    elements: Vec<(SlotKey, Felt)>,
    lengths: Vec<(Identification, u64)>,
}

impl Changeset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_element(&mut self, identification: Identification, index: u64, value: Felt) {
        self.elements.push((SlotKey::new(identification, index), value));
    }

    pub fn set_length(&mut self, identification: Identification, length: u64) {
        self.lengths.push((identification, length));
    }

    pub fn elements(&self) -> &[(SlotKey, Felt)] {
        &self.elements
    }

    pub fn lengths(&self) -> &[(Identification, u64)] {
        &self.lengths
    }

    /// Number of writes.
    pub fn len(&self) -> usize {
        self.elements.len() + self.lengths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty() && self.lengths.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collects_writes() {
        let id = Identification::new(5);
        let mut changes = Changeset::new();
        assert!(changes.is_empty());

        changes.set_element(id, 0, Felt::new(42));
        changes.set_length(id, 1);

        assert_eq!(changes.len(), 2);
        assert_eq!(changes.elements(), &[(SlotKey::new(id, 0), Felt::new(42))]);
        assert_eq!(changes.lengths(), &[(id, 1)]);
    }
}
