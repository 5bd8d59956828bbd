/// Storage-specific errors
use thiserror::Error;

/// Result type alias using `StorageError`
pub type Result<T> = std::result::Result<T, StorageError>;

/// Storage error types
#[derive(Error, Debug)]
pub enum StorageError {
    /// Key cannot be mapped to a file name
    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Metadata probing failed
    #[error("Probe error: {0}")]
    Probe(String),

    /// I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Error reported by a backend through the core trait
    #[error(transparent)]
    Backend(#[from] melos_core::MelosError),
}

impl From<StorageError> for melos_core::MelosError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Backend(inner) => inner,
            StorageError::Probe(msg) => melos_core::MelosError::metadata(msg),
            other => melos_core::MelosError::storage(other.to_string()),
        }
    }
}
