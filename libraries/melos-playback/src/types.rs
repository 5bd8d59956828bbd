//! Core types for playback management

use melos_core::{AppSettings, TrackId};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackState {
    /// No track loaded
    Stopped,

    /// Track loaded, not rendering
    Paused,

    /// Track loaded and rendering
    Playing,
}

impl PlaybackState {
    /// Whether a track is loaded
    pub fn is_loaded(self) -> bool {
        !matches!(self, PlaybackState::Stopped)
    }
}

/// Playback configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackConfig {
    /// Seconds jumped by skip forward/backward (default: 15)
    pub skip_interval_secs: u32,

    /// Two back taps closer than this go to the previous track (default: 400ms)
    pub double_tap_window: Duration,

    /// How often the controller polls the decoder position (default: 250ms)
    pub progress_interval: Duration,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            skip_interval_secs: AppSettings::DEFAULT_SKIP_INTERVAL_SECS,
            double_tap_window: Duration::from_millis(400),
            progress_interval: Duration::from_millis(250),
        }
    }
}

/// Read-only view of the session and queue position
///
/// Published to displays and to the system now-playing info.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Session state
    pub state: PlaybackState,

    /// Loaded track, if any
    pub track_id: Option<TrackId>,

    /// Title of the loaded track
    pub title: Option<String>,

    /// Playhead in seconds
    pub elapsed_secs: f64,

    /// Duration of the loaded track in seconds
    pub duration_secs: f64,

    /// Whether audio is rendering
    pub is_playing: bool,

    /// Current queue index (`None` when the queue is empty)
    pub queue_position: Option<usize>,

    /// Number of queue entries
    pub queue_length: usize,
}

impl SessionSnapshot {
    /// Snapshot of an idle player with an empty queue
    pub fn idle() -> Self {
        Self {
            state: PlaybackState::Stopped,
            track_id: None,
            title: None,
            elapsed_secs: 0.0,
            duration_secs: 0.0,
            is_playing: false,
            queue_position: None,
            queue_length: 0,
        }
    }
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self::idle()
    }
}
