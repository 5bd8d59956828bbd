//! Error types for playback management

use thiserror::Error;

/// Playback errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// The controller task has shut down
    #[error("Playback controller is not running")]
    ControllerClosed,

    /// Queue record could not be encoded or decoded
    #[error("Queue record error: {0}")]
    Record(#[from] serde_json::Error),

    /// Collaborator (decoder, catalog, store) error
    #[error(transparent)]
    Core(#[from] melos_core::MelosError),
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
