//! Back button disambiguation
//!
//! One tap restarts the current track after a short delay. A second tap
//! inside the window cancels that restart and goes to the previous track.
//!
//! ```text
//! t=0.0  tap  -> RestartPending(#1)     (caller sleeps for the window)
//! t=0.1  tap  -> Previous               (#1 is now stale)
//! t=0.4  fire(#1) -> ignored
//! ```

use std::time::{Duration, Instant};

/// Identifies the single pending restart
///
/// Only the token handed out by the latest tap can fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RestartToken(u64);

impl RestartToken {
    /// Generation number of the tap that issued this token
    pub fn generation(self) -> u64 {
        self.0
    }
}

/// Outcome of a back tap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackTap {
    /// Second tap inside the window: go to the previous track now
    Previous,

    /// First tap: restart after the window unless superseded
    RestartPending(RestartToken),
}

/// Tap record for the back gesture
#[derive(Debug, Clone)]
pub struct BackGesture {
    window: Duration,
    last_tap: Option<Instant>,
    generation: u64,
}

impl BackGesture {
    /// Create a recognizer with the given double-tap window
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_tap: None,
            generation: 0,
        }
    }

    /// Double-tap window
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Register a tap at `now`
    ///
    /// Every tap bumps the generation, which invalidates any earlier token.
    pub fn tap(&mut self, now: Instant) -> BackTap {
        self.generation += 1;

        if let Some(last) = self.last_tap {
            if now.saturating_duration_since(last) < self.window {
                self.last_tap = None;
                return BackTap::Previous;
            }
        }

        self.last_tap = Some(now);
        BackTap::RestartPending(RestartToken(self.generation))
    }

    /// Whether a deferred restart carrying `token` should still run
    pub fn should_restart(&self, token: RestartToken) -> bool {
        self.last_tap.is_some() && token.0 == self.generation
    }

    /// Forget the last tap and invalidate any pending restart
    pub fn reset(&mut self) {
        self.last_tap = None;
        self.generation += 1;
    }
}
