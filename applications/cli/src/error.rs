/// CLI error types
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown track: {0}")]
    UnknownTrack(String),

    #[error("Queue position {index} is out of range (queue has {len} entries)")]
    InvalidPosition { index: usize, len: usize },

    #[error("Unsupported skip interval {0}s (choose one of 5, 10, 15, 30)")]
    InvalidSkipInterval(u32),

    #[error("Storage error: {0}")]
    Storage(#[from] melos_storage::StorageError),

    #[error("Playback error: {0}")]
    Playback(#[from] melos_playback::PlaybackError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<config::ConfigError> for CliError {
    fn from(err: config::ConfigError) -> Self {
        CliError::Config(err.to_string())
    }
}
