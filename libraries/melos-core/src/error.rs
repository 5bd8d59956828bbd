/// Core error types for Melos
use thiserror::Error;

use crate::types::TrackId;

/// Result type alias using `MelosError`
pub type Result<T> = std::result::Result<T, MelosError>;

/// Core error type for Melos
#[derive(Error, Debug)]
pub enum MelosError {
    /// Persistence backend errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Audio decoding/output errors
    #[error("Audio error: {0}")]
    Audio(String),

    /// Metadata probing errors
    #[error("Metadata error: {0}")]
    Metadata(String),

    /// Track not found in the catalog
    #[error("Track not found: {0}")]
    TrackNotFound(TrackId),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl MelosError {
    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create an audio error
    pub fn audio(msg: impl Into<String>) -> Self {
        Self::Audio(msg.into())
    }

    /// Create a metadata error
    pub fn metadata(msg: impl Into<String>) -> Self {
        Self::Metadata(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audio_error_message() {
        let err = MelosError::audio("device busy");
        assert_eq!(err.to_string(), "Audio error: device busy");
    }

    #[test]
    fn track_not_found_names_the_track() {
        let err = MelosError::TrackNotFound(TrackId::new("abc"));
        assert_eq!(err.to_string(), "Track not found: abc");
    }
}
