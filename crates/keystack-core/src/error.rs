use keystack_storage::StorageError;
use thiserror::Error;

/// Errors that can occur in stack operations.
#[derive(Debug, Error)]
pub enum StackError {
    /// Pop or peek on a stack of length 0. The message is matched on by clients.
    #[error("Stack empty")]
    StackEmpty,

    #[error("Stack full: limit {limit}")]
    StackFull { limit: u64 },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl StackError {
    /// Whether the caller sent an operation the stack's state rejects,
    /// as opposed to a backend failure.
    pub fn is_rejection(&self) -> bool {
        matches!(self, StackError::StackEmpty | StackError::StackFull { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stack_empty_message() {
        assert_eq!(StackError::StackEmpty.to_string(), "Stack empty");
    }

    #[test]
    fn test_stack_full_message() {
        let err = StackError::StackFull { limit: 2 };
        assert!(err.to_string().contains("Stack full"));
        assert!(err.to_string().contains('2'));
    }

    #[test]
    fn test_rejection_kinds() {
        assert!(StackError::StackEmpty.is_rejection());
        assert!(StackError::StackFull { limit: 1 }.is_rejection());
        assert!(!StackError::Storage(StorageError::Io("x".into())).is_rejection());
    }
}
