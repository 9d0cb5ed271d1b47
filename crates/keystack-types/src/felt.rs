use crate::error::TypesError;
use std::fmt;
use std::str::FromStr;

/// Fixed-width integer stored in a stack slot.
///
/// Signed 128-bit. Slots that were never written read as `Felt::ZERO`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "borsh", derive(borsh::BorshSerialize, borsh::BorshDeserialize))]
pub struct Felt(i128);

impl Felt {
    pub const ZERO: Self = Self(0);
    pub const MIN: Self = Self(i128::MIN);
    pub const MAX: Self = Self(i128::MAX);
    pub const LEN: usize = 16;

    pub const fn new(value: i128) -> Self {
        Self(value)
    }

    pub const fn value(&self) -> i128 {
        self.0
    }

    pub const fn to_le_bytes(&self) -> [u8; 16] {
        self.0.to_le_bytes()
    }

    pub const fn from_le_bytes(bytes: [u8; 16]) -> Self {
        Self(i128::from_le_bytes(bytes))
    }
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Felt {
                fn from(value: $t) -> Self {
                    Self(value as i128)
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, i128, u8, u16, u32, u64);

impl From<Felt> for i128 {
    fn from(felt: Felt) -> Self {
        felt.0
    }
}

impl fmt::Display for Felt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for Felt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Felt({})", self.0)
    }
}

impl FromStr for Felt {
    type Err = TypesError;

    /// Accepts decimal with optional sign (`"-20"`) or hex (`"0x2a"`, `"-0x2a"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (negative, body) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };

        let magnitude = if let Some(hex_part) = body.strip_prefix("0x").or_else(|| body.strip_prefix("0X")) {
            if hex_part.is_empty() {
                return Err(TypesError::InvalidInteger(s.to_string()));
            }
            u128::from_str_radix(hex_part, 16)?
        } else {
            body.parse::<u128>()?
        };

        let value = if negative {
            // i128::MIN has no positive counterpart
            if magnitude == i128::MIN.unsigned_abs() {
                i128::MIN
            } else {
                i128::try_from(magnitude)
                    .map(|v| -v)
                    .map_err(|_| TypesError::InvalidInteger(s.to_string()))?
            }
        } else {
            i128::try_from(magnitude).map_err(|_| TypesError::InvalidInteger(s.to_string()))?
        };

        Ok(Self(value))
    }
}
