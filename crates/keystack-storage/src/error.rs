use thiserror::Error;

/// Errors that can occur in storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        StorageError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::Serialization(e.to_string())
    }
}

impl From<hex::FromHexError> for StorageError {
    fn from(e: hex::FromHexError) -> Self {
        StorageError::Deserialization(e.to_string())
    }
}

impl From<keystack_types::TypesError> for StorageError {
    fn from(e: keystack_types::TypesError) -> Self {
        StorageError::Deserialization(e.to_string())
    }
}
