//! Playback Events
//!
//! Event-based communication for display synchronization. Events are
//! emitted at key points:
//! - State changes (play/pause/stop)
//! - Track changes (including skips over deleted tracks)
//! - Position updates (periodic and on seek)
//! - Queue mutations

use crate::types::PlaybackState;
use melos_core::TrackId;
use serde::{Deserialize, Serialize};

/// Events emitted by the playback system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlaybackEvent {
    /// Playback state changed
    StateChanged {
        /// The new playback state
        state: PlaybackState,
    },

    /// A different track was loaded
    TrackChanged {
        /// ID of the new (current) track
        track_id: TrackId,
        /// ID of the previously loaded track (if any)
        previous_track_id: Option<TrackId>,
    },

    /// Track reached its end
    TrackFinished {
        /// ID of the finished track
        track_id: TrackId,
    },

    /// A queued track was missing from the catalog and got skipped
    TrackSkipped {
        /// ID of the missing track
        track_id: TrackId,
    },

    /// Position update
    PositionUpdate {
        /// Playhead in seconds
        elapsed_secs: f64,
        /// Track duration in seconds
        duration_secs: f64,
    },

    /// Queue changed (entries added/removed/reordered or cursor moved)
    QueueChanged {
        /// New queue length
        length: usize,
        /// New current index
        current_index: usize,
    },

    /// Decoder reported an error
    Error {
        /// Error message
        message: String,
    },
}
