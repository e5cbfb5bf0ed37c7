use hive_types::{PathError, StorageName};

/// Errors from storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A path, name, or audit stamp failed validation.
    #[error(transparent)]
    Path(#[from] PathError),

    /// An argument was rejected before any state was touched.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The store does not support the requested operation.
    #[error("unsupported operation: {0}")]
    Unsupported(String),

    /// A named-value environment rejected the key.
    #[error("invalid environment name: {0}")]
    InvalidEnvironmentName(StorageName),

    /// An internal lock was poisoned by a panicking writer.
    #[error("lock poisoned: {0}")]
    LockPoisoned(String),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    pub(crate) fn poisoned(err: impl std::fmt::Display) -> Self {
        StoreError::LockPoisoned(err.to_string())
    }
}
