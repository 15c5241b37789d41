use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors raised by collaborator stores.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("record not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance { requested: String, available: String },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("backend error: {0}")]
    Backend(String),
}

/// Boxed error returned by external callbacks (allocators, migration hooks).
pub type CallbackError = Box<dyn std::error::Error + Send + Sync>;

/// Result type for external callbacks.
pub type CallbackResult = Result<(), CallbackError>;
