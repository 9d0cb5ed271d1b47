use crate::error::TypesError;
use crate::Identification;
use std::fmt;

/// Address of one element slot: `(identification, index)`.
///
/// Index `length - 1` of an instance is its top. Indices at or above the
/// current length are stale.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "borsh", derive(borsh::BorshSerialize, borsh::BorshDeserialize))]
pub struct SlotKey {
    pub identification: Identification,
    pub index: u64,
}

impl SlotKey {
    /// Encoded key length in bytes
    pub const LEN: usize = 16;

    pub const fn new(identification: Identification, index: u64) -> Self {
        Self { identification, index }
    }

    /// Fixed-width key bytes: little-endian identification then index.
    ///
    /// Matches the borsh encoding of the struct.
    pub fn to_bytes(&self) -> [u8; 16] {
        let mut out = [0u8; 16];
        out[..8].copy_from_slice(&self.identification.to_le_bytes());
        out[8..].copy_from_slice(&self.index.to_le_bytes());
        out
    }

    /// Decode from the fixed-width key bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TypesError> {
        if bytes.len() != Self::LEN {
            return Err(TypesError::InvalidSlotKeyLength {
                expected: Self::LEN,
                actual: bytes.len(),
            });
        }
        let mut id = [0u8; 8];
        let mut index = [0u8; 8];
        id.copy_from_slice(&bytes[..8]);
        index.copy_from_slice(&bytes[8..]);
        Ok(Self {
            identification: Identification::new(u64::from_le_bytes(id)),
            index: u64::from_le_bytes(index),
        })
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.identification, self.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_key_bytes() {
        let key = SlotKey::new(Identification::new(3), 9);
        let bytes = key.to_bytes();
        assert_eq!(&bytes[..8], &3u64.to_le_bytes());
        assert_eq!(&bytes[8..], &9u64.to_le_bytes());
        assert_eq!(SlotKey::from_bytes(&bytes).unwrap(), key);
    }

    #[test]
    fn test_slot_key_invalid_length() {
        let err = SlotKey::from_bytes(&[0u8; 15]).unwrap_err();
        assert_eq!(err, TypesError::InvalidSlotKeyLength { expected: 16, actual: 15 });
    }

    #[cfg(feature = "borsh")]
    #[test]
    fn test_slot_key_matches_borsh() {
        let key = SlotKey::new(Identification::new(u64::MAX), 1);
        let encoded = borsh::to_vec(&key).unwrap();
        assert_eq!(encoded, key.to_bytes().to_vec());
    }

    #[test]
    fn test_slot_key_display() {
        let key = SlotKey::new(Identification::new(2), 0);
        assert_eq!(key.to_string(), "2[0]");
    }
}
