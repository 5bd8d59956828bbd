//! System media controls
//!
//! Lock-screen and headset buttons arrive as [`RemoteCommand`]s. The
//! command center forwards them to the controller through a handle it does
//! not own: after [`RemoteCommandCenter::detach`] (or once the controller
//! is gone) every command reports `NoActionableItem`.

use crate::controller::{ControlCommand, ControlHandle};
use crate::types::SessionSnapshot;
use serde::{Deserialize, Serialize};

/// Command from the system media controls
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RemoteCommand {
    /// Resume playback
    Play,
    /// Pause playback
    Pause,
    /// Flip between playing and paused
    TogglePlayPause,
    /// Next queue entry
    NextTrack,
    /// Previous queue entry
    PreviousTrack,
    /// Scrubber moved (seconds)
    ChangePlaybackPosition(f64),
    /// Jump ahead by the skip interval
    SkipForward,
    /// Jump back by the skip interval
    SkipBackward,
}

/// Result reported back to the system media controls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandStatus {
    /// Command was forwarded
    Success,
    /// Command was malformed
    CommandFailed,
    /// Nothing to control
    NoActionableItem,
}

/// Routes remote commands to the player
#[derive(Debug, Default)]
pub struct RemoteCommandCenter {
    handle: Option<ControlHandle>,
}

impl RemoteCommandCenter {
    /// Attach to a running controller
    pub fn new(handle: ControlHandle) -> Self {
        Self {
            handle: Some(handle),
        }
    }

    /// Drop the handle; later commands report `NoActionableItem`
    pub fn detach(&mut self) {
        if self.handle.take().is_some() {
            tracing::debug!("Remote command center detached");
        }
    }

    /// Whether a live controller is attached
    pub fn is_attached(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_closed())
    }

    /// Forward a remote command
    pub fn dispatch(&self, command: RemoteCommand) -> CommandStatus {
        let Some(handle) = &self.handle else {
            return CommandStatus::NoActionableItem;
        };

        let command = match command {
            RemoteCommand::Play => ControlCommand::Resume,
            RemoteCommand::Pause => ControlCommand::Pause,
            RemoteCommand::TogglePlayPause => ControlCommand::TogglePlayPause,
            RemoteCommand::NextTrack => ControlCommand::SkipToNext,
            RemoteCommand::PreviousTrack => ControlCommand::SkipToPrevious,
            RemoteCommand::ChangePlaybackPosition(secs) if secs.is_finite() => {
                ControlCommand::Seek(secs)
            }
            RemoteCommand::ChangePlaybackPosition(_) => return CommandStatus::CommandFailed,
            RemoteCommand::SkipForward => ControlCommand::SkipForward,
            RemoteCommand::SkipBackward => ControlCommand::SkipBackward,
        };

        match handle.send(command) {
            Ok(()) => CommandStatus::Success,
            Err(e) => {
                tracing::debug!("Remote command dropped: {}", e);
                CommandStatus::NoActionableItem
            }
        }
    }

    /// Now-playing info for the last published snapshot
    pub fn now_playing(&self) -> Option<NowPlayingInfo> {
        self.handle
            .as_ref()
            .and_then(|h| NowPlayingInfo::from_snapshot(&h.snapshot()))
    }
}

/// What the system shows on the lock screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NowPlayingInfo {
    /// Track title
    pub title: String,
    /// Duration in seconds
    pub duration_secs: f64,
    /// Playhead in seconds
    pub elapsed_secs: f64,
    /// 1.0 while playing, 0.0 otherwise
    pub playback_rate: f64,
}

impl NowPlayingInfo {
    /// Build the info, or `None` when nothing is loaded (clear the display)
    pub fn from_snapshot(snapshot: &SessionSnapshot) -> Option<Self> {
        let title = snapshot.title.clone()?;
        Some(Self {
            title,
            duration_secs: snapshot.duration_secs,
            elapsed_secs: snapshot.elapsed_secs,
            playback_rate: if snapshot.is_playing { 1.0 } else { 0.0 },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PlaybackState;
    use melos_core::TrackId;

    #[test]
    fn detached_center_has_nothing_to_control() {
        let center = RemoteCommandCenter::default();
        assert!(!center.is_attached());
        assert_eq!(center.dispatch(RemoteCommand::Play), CommandStatus::NoActionableItem);
        assert!(center.now_playing().is_none());
    }

    #[test]
    fn stopped_snapshot_clears_now_playing() {
        assert!(NowPlayingInfo::from_snapshot(&SessionSnapshot::idle()).is_none());
    }

    #[test]
    fn playback_rate_follows_playing_flag() {
        let mut snapshot = SessionSnapshot {
            state: PlaybackState::Playing,
            track_id: Some(TrackId::new("a")),
            title: Some("Morning".to_string()),
            elapsed_secs: 12.0,
            duration_secs: 180.0,
            is_playing: true,
            queue_position: Some(0),
            queue_length: 1,
        };

        let info = NowPlayingInfo::from_snapshot(&snapshot).unwrap();
        assert_eq!(info.title, "Morning");
        assert_eq!(info.playback_rate, 1.0);

        snapshot.is_playing = false;
        snapshot.state = PlaybackState::Paused;
        assert_eq!(NowPlayingInfo::from_snapshot(&snapshot).unwrap().playback_rate, 0.0);
    }
}
