//! Playback session
//!
//! Bridges the queue's current entry to the decoder. The session owns the
//! transient device state (loaded track, playhead, duration, playing flag);
//! the queue is borrowed per call and the catalog is shared.
//!
//! ```text
//!            play/load             pause
//!  Stopped ─────────────► Playing ───────► Paused
//!     ▲                      ▲ ◄─────────── │
//!     │        stop          │    resume    │
//!     └──────────────────────┴──────────────┘
//! ```
//!
//! Nothing here returns an error: missing tracks are skipped, decoder
//! failures stop the session and surface as [`PlaybackEvent::Error`].

use crate::back_gesture::{BackGesture, BackTap, RestartToken};
use crate::events::PlaybackEvent;
use crate::queue::QueueEngine;
use crate::types::{PlaybackConfig, PlaybackState, SessionSnapshot};
use melos_core::{LoadId, MediaDecoder, Track, TrackCatalog};
use std::sync::Arc;
use std::time::Instant;

/// Device-facing half of the player
pub struct PlaybackSession {
    decoder: Box<dyn MediaDecoder>,
    catalog: Arc<dyn TrackCatalog>,

    state: PlaybackState,
    current_track: Option<Track>,
    // Bumped on every load; decoder reports for other loads are stale
    load_id: LoadId,
    elapsed_secs: f64,
    duration_secs: f64,
    skip_interval_secs: u32,

    back_gesture: BackGesture,

    // Event queue for display synchronization
    pending_events: Vec<PlaybackEvent>,
}

impl PlaybackSession {
    /// Create a stopped session
    pub fn new(
        decoder: Box<dyn MediaDecoder>,
        catalog: Arc<dyn TrackCatalog>,
        config: PlaybackConfig,
    ) -> Self {
        Self {
            decoder,
            catalog,
            state: PlaybackState::Stopped,
            current_track: None,
            load_id: LoadId::default(),
            elapsed_secs: 0.0,
            duration_secs: 0.0,
            skip_interval_secs: config.skip_interval_secs,
            back_gesture: BackGesture::new(config.double_tap_window),
            pending_events: Vec::new(),
        }
    }

    // ===== Track Loading =====

    /// Load and play the queue's current entry
    ///
    /// Entries whose track is gone from the catalog are skipped, at most
    /// once around the queue. If nothing playable is found the session
    /// stops.
    pub fn play_current(&mut self, queue: &mut QueueEngine) {
        match self.resolve_current(queue) {
            Some(track) => self.load(track, true),
            None => self.stop(),
        }
    }

    /// Load the queue's current entry without playing it
    ///
    /// Used at startup to put the restored queue back on screen. Missing
    /// tracks are not skipped here; the session simply stays stopped.
    pub fn cue_current(&mut self, queue: &QueueEngine) {
        let track = queue
            .current_entry()
            .and_then(|entry| self.catalog.resolve(&entry.track_id));

        match track {
            Some(track) => self.load(track, false),
            None => self.stop(),
        }
    }

    fn resolve_current(&mut self, queue: &mut QueueEngine) -> Option<Track> {
        for _ in 0..queue.len() {
            let track_id = queue.current_entry()?.track_id.clone();
            if let Some(track) = self.catalog.resolve(&track_id) {
                return Some(track);
            }

            tracing::debug!("Track {} is no longer in the library, skipping", track_id);
            self.pending_events.push(PlaybackEvent::TrackSkipped { track_id });
            queue.advance();
        }

        None
    }

    fn load(&mut self, track: Track, autoplay: bool) {
        let locator = self.catalog.locator(&track);
        self.load_id = self.load_id.next();

        let mut result = self.decoder.load(&locator, self.load_id);
        if autoplay && result.is_ok() {
            result = self.decoder.play();
        }

        if let Err(e) = result {
            tracing::error!("Failed to load {}: {}", locator.display(), e);
            self.stop();
            self.pending_events.push(PlaybackEvent::Error {
                message: e.to_string(),
            });
            return;
        }

        let reported = self.decoder.duration();
        self.duration_secs = if reported > 0.0 {
            reported
        } else if track.duration_secs.is_finite() {
            // Catalog values are not trusted to be sane
            track.duration_secs.max(0.0)
        } else {
            0.0
        };
        self.elapsed_secs = 0.0;

        let previous_track_id = self.current_track.as_ref().map(|t| t.id.clone());
        tracing::info!("Loaded {:?} ({})", track.title, track.id);
        self.pending_events.push(PlaybackEvent::TrackChanged {
            track_id: track.id.clone(),
            previous_track_id,
        });
        self.current_track = Some(track);

        self.set_state(if autoplay {
            PlaybackState::Playing
        } else {
            PlaybackState::Paused
        });
    }

    // ===== Playback Control =====

    /// Flip between playing and paused; no-op when stopped
    pub fn toggle_play_pause(&mut self) {
        match self.state {
            PlaybackState::Playing => self.pause(),
            PlaybackState::Paused => self.resume(),
            PlaybackState::Stopped => {}
        }
    }

    /// Pause playback
    pub fn pause(&mut self) {
        if self.state == PlaybackState::Playing {
            self.decoder.pause();
            self.elapsed_secs = self.decoder.elapsed();
            self.set_state(PlaybackState::Paused);
        }
    }

    /// Resume a paused track
    pub fn resume(&mut self) {
        if self.state == PlaybackState::Paused {
            self.decoder.resume();
            self.set_state(PlaybackState::Playing);
        }
    }

    /// Stop playback
    ///
    /// Releases the decoder and clears the loaded track (but not the queue).
    /// Calling it again changes nothing.
    pub fn stop(&mut self) {
        if self.state == PlaybackState::Stopped && self.current_track.is_none() {
            return;
        }

        self.decoder.unload();
        self.current_track = None;
        self.elapsed_secs = 0.0;
        self.duration_secs = 0.0;
        self.back_gesture.reset();
        self.set_state(PlaybackState::Stopped);
    }

    // ===== Seek =====

    /// Move the playhead, clamped to the track
    pub fn seek(&mut self, position_secs: f64) {
        if !self.state.is_loaded() {
            return;
        }
        if position_secs.is_nan() {
            tracing::debug!("Ignoring seek to NaN");
            return;
        }

        let target = position_secs.clamp(0.0, self.duration_secs.max(0.0));
        self.decoder.seek(target);
        self.elapsed_secs = target;
        self.emit_position();
    }

    /// Jump ahead by the skip interval
    pub fn skip_forward(&mut self) {
        if self.state.is_loaded() {
            let target = self.decoder.elapsed() + f64::from(self.skip_interval_secs);
            self.seek(target);
        }
    }

    /// Jump back by the skip interval
    pub fn skip_backward(&mut self) {
        if self.state.is_loaded() {
            let target = self.decoder.elapsed() - f64::from(self.skip_interval_secs);
            self.seek(target);
        }
    }

    // ===== Queue Navigation =====

    /// Advance the queue (wrapping) and play the new entry
    pub fn skip_to_next(&mut self, queue: &mut QueueEngine) {
        if queue.advance() {
            self.play_current(queue);
        }
    }

    /// Rewind the queue (wrapping) and play the new entry
    pub fn skip_to_previous(&mut self, queue: &mut QueueEngine) {
        if queue.rewind() {
            self.play_current(queue);
        }
    }

    /// Back button tap at `now`
    ///
    /// A tap inside the double-tap window goes to the previous track and
    /// returns `None`. Otherwise the returned token must be passed to
    /// [`PlaybackSession::deferred_restart`] once the window has elapsed.
    pub fn back_gesture(&mut self, now: Instant, queue: &mut QueueEngine) -> Option<RestartToken> {
        match self.back_gesture.tap(now) {
            BackTap::Previous => {
                self.skip_to_previous(queue);
                None
            }
            BackTap::RestartPending(token) => Some(token),
        }
    }

    /// Restart the track if `token` is still the latest back tap
    ///
    /// Returns whether the restart ran.
    pub fn deferred_restart(&mut self, token: RestartToken) -> bool {
        if !self.back_gesture.should_restart(token) {
            return false;
        }
        self.seek(0.0);
        true
    }

    /// Double-tap window in use
    pub fn double_tap_window(&self) -> std::time::Duration {
        self.back_gesture.window()
    }

    // ===== Decoder Callbacks =====

    /// Decoder reached the end of the track loaded as `load_id`
    ///
    /// Ignored when nothing is loaded or when `load_id` belongs to an
    /// earlier load (the user skipped or stopped before the report arrived).
    pub fn handle_finished(&mut self, load_id: LoadId, queue: &mut QueueEngine) {
        let Some(track_id) = self.accepts(load_id).map(|t| t.id.clone()) else {
            tracing::debug!("Dropping finished report for stale load {}", load_id);
            return;
        };
        self.pending_events.push(PlaybackEvent::TrackFinished { track_id });
        if self.state == PlaybackState::Playing {
            self.elapsed_secs = self.duration_secs;
            self.set_state(PlaybackState::Paused);
        }

        self.skip_to_next(queue);
    }

    /// Decoder failed mid-track
    ///
    /// The track stays loaded but stops rendering. Reports for anything but
    /// the current load are ignored.
    pub fn handle_decode_error(&mut self, load_id: LoadId, message: &str) {
        if self.accepts(load_id).is_none() {
            tracing::debug!("Dropping decode error for stale load {}: {}", load_id, message);
            return;
        }
        tracing::error!("Decode error: {}", message);
        if self.state == PlaybackState::Playing {
            self.decoder.pause();
            self.set_state(PlaybackState::Paused);
        }
        self.pending_events.push(PlaybackEvent::Error {
            message: message.to_string(),
        });
    }

    fn accepts(&self, load_id: LoadId) -> Option<&Track> {
        self.current_track.as_ref().filter(|_| load_id == self.load_id)
    }

    /// Poll the decoder's playhead
    ///
    /// Returns true (and queues a position event) while playing.
    pub fn refresh_position(&mut self) -> bool {
        if self.state != PlaybackState::Playing {
            return false;
        }

        self.elapsed_secs = self.decoder.elapsed();
        let reported = self.decoder.duration();
        if reported > 0.0 {
            self.duration_secs = reported;
        }
        self.emit_position();
        true
    }

    // ===== Settings =====

    /// Change the skip interval; zero is ignored
    pub fn set_skip_interval(&mut self, secs: u32) {
        if secs == 0 {
            tracing::debug!("Ignoring zero skip interval");
            return;
        }
        self.skip_interval_secs = secs;
    }

    /// Current skip interval in seconds
    pub fn skip_interval_secs(&self) -> u32 {
        self.skip_interval_secs
    }

    // ===== State Queries =====

    /// Session state
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Whether audio is rendering
    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    /// Loaded track
    pub fn current_track(&self) -> Option<&Track> {
        self.current_track.as_ref()
    }

    /// Playhead in seconds
    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed_secs
    }

    /// Duration of the loaded track in seconds
    pub fn duration_secs(&self) -> f64 {
        self.duration_secs
    }

    /// Snapshot of the session together with the queue position
    pub fn snapshot(&self, queue: &QueueEngine) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state,
            track_id: self.current_track.as_ref().map(|t| t.id.clone()),
            title: self.current_track.as_ref().map(|t| t.title.clone()),
            elapsed_secs: self.elapsed_secs,
            duration_secs: self.duration_secs,
            is_playing: self.is_playing(),
            queue_position: if queue.is_empty() {
                None
            } else {
                Some(queue.current_index())
            },
            queue_length: queue.len(),
        }
    }

    // ===== Events =====

    /// Take all pending events
    pub fn drain_events(&mut self) -> Vec<PlaybackEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Check if there are pending events
    pub fn has_pending_events(&self) -> bool {
        !self.pending_events.is_empty()
    }

    fn set_state(&mut self, state: PlaybackState) {
        if self.state != state {
            self.state = state;
            self.pending_events.push(PlaybackEvent::StateChanged { state });
        }
    }

    fn emit_position(&mut self) {
        self.pending_events.push(PlaybackEvent::PositionUpdate {
            elapsed_secs: self.elapsed_secs,
            duration_secs: self.duration_secs,
        });
    }
}
