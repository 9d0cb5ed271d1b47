use crate::error::TypesError;
use std::fmt;
use std::str::FromStr;

/// Caller-supplied key addressing one independent stack instance.
///
/// Any non-negative integer is valid; two identifications name the same
/// stack exactly when their values are equal.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "borsh", derive(borsh::BorshSerialize, borsh::BorshDeserialize))]
pub struct Identification(u64);

impl Identification {
    pub const ZERO: Self = Self(0);

    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn value(&self) -> u64 {
        self.0
    }

    pub const fn to_le_bytes(&self) -> [u8; 8] {
        self.0.to_le_bytes()
    }
}

impl From<u64> for Identification {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<Identification> for u64 {
    fn from(id: Identification) -> Self {
        id.0
    }
}

impl fmt::Display for Identification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for Identification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identification({})", self.0)
    }
}

impl FromStr for Identification {
    type Err = TypesError;

    /// Accepts decimal (`"42"`) or hex (`"0x2a"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(hex_part) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            if hex_part.is_empty() {
                return Err(TypesError::InvalidInteger(s.to_string()));
            }
            Ok(Self(u64::from_str_radix(hex_part, 16)?))
        } else {
            Ok(Self(s.parse()?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_decimal() {
        let id: Identification = "42".parse().unwrap();
        assert_eq!(id, Identification::new(42));
    }

    #[test]
    fn test_parse_hex() {
        let id: Identification = "0x2a".parse().unwrap();
        assert_eq!(id.value(), 42);
        let id: Identification = "0X2A".parse().unwrap();
        assert_eq!(id.value(), 42);
    }

    #[test]
    fn test_parse_invalid() {
        assert!("".parse::<Identification>().is_err());
        assert!("0x".parse::<Identification>().is_err());
        assert!("-1".parse::<Identification>().is_err());
        assert!("abc".parse::<Identification>().is_err());
    }

    #[test]
    fn test_display_and_debug() {
        let id = Identification::new(7);
        assert_eq!(id.to_string(), "7");
        assert_eq!(format!("{:?}", id), "Identification(7)");
    }

    #[test]
    fn test_default_is_zero() {
        assert_eq!(Identification::default(), Identification::ZERO);
    }
}
