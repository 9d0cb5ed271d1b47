//! Serde implementations for keystack-types
//!
//! Integers serialize as JSON numbers and deserialize from either numbers
//! or decimal / `0x`-hex strings.

use crate::*;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

// Felt
impl Serialize for Felt {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i128(self.value())
    }
}

struct FeltVisitor;

impl<'de> Visitor<'de> for FeltVisitor {
    type Value = Felt;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an integer or an integer string")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Felt, E> {
        Ok(Felt::from(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Felt, E> {
        Ok(Felt::from(v))
    }

    fn visit_i128<E: de::Error>(self, v: i128) -> Result<Felt, E> {
        Ok(Felt::new(v))
    }

    fn visit_u128<E: de::Error>(self, v: u128) -> Result<Felt, E> {
        i128::try_from(v)
            .map(Felt::new)
            .map_err(|_| E::custom(format!("integer out of range: {}", v)))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Felt, E> {
        Felt::from_str(v).map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for Felt {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(FeltVisitor)
    }
}

// Identification
impl Serialize for Identification {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(self.value())
    }
}

struct IdentificationVisitor;

impl<'de> Visitor<'de> for IdentificationVisitor {
    type Value = Identification;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a non-negative integer or an integer string")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Identification, E> {
        Ok(Identification::new(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Identification, E> {
        u64::try_from(v)
            .map(Identification::new)
            .map_err(|_| E::custom(format!("identification must be non-negative: {}", v)))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Identification, E> {
        Identification::from_str(v).map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for Identification {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(IdentificationVisitor)
    }
}

// OperationKind
impl Serialize for OperationKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for OperationKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        OperationKind::from_str(&s).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_felt_from_number_and_string() {
        let a: Felt = serde_json::from_str("42").unwrap();
        let b: Felt = serde_json::from_str("\"42\"").unwrap();
        let c: Felt = serde_json::from_str("\"0x2a\"").unwrap();
        let d: Felt = serde_json::from_str("-22").unwrap();
        assert_eq!(a, Felt::new(42));
        assert_eq!(b, a);
        assert_eq!(c, a);
        assert_eq!(d, Felt::new(-22));
    }

    #[test]
    fn test_felt_serializes_as_number() {
        assert_eq!(serde_json::to_string(&Felt::new(-5)).unwrap(), "-5");
    }

    #[test]
    fn test_identification_rejects_negative() {
        assert!(serde_json::from_str::<Identification>("-1").is_err());
        let id: Identification = serde_json::from_str("\"7\"").unwrap();
        assert_eq!(id, Identification::new(7));
    }

    #[test]
    fn test_operation_kind_serde() {
        let kind: OperationKind = serde_json::from_str("\"peek\"").unwrap();
        assert_eq!(kind, OperationKind::Peek);
        assert_eq!(serde_json::to_string(&OperationKind::Search).unwrap(), "\"search\"");
        assert!(serde_json::from_str::<OperationKind>("\"drop\"").is_err());
    }
}
