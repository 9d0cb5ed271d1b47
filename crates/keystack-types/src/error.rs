use thiserror::Error;

/// Errors that can occur in type operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TypesError {
    #[error("Invalid integer: {0}")]
    InvalidInteger(String),

    #[error("Invalid hex: {0}")]
    InvalidHex(String),

    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    #[error("Invalid slot key length: expected {expected}, got {actual}")]
    InvalidSlotKeyLength { expected: usize, actual: usize },
}

impl From<std::num::ParseIntError> for TypesError {
    fn from(e: std::num::ParseIntError) -> Self {
        TypesError::InvalidInteger(e.to_string())
    }
}

impl From<hex::FromHexError> for TypesError {
    fn from(e: hex::FromHexError) -> Self {
        TypesError::InvalidHex(e.to_string())
    }
}
