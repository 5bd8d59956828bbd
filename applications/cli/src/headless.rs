//! Headless decoder
//!
//! Stands in for an audio device: it keeps a wall-clock playhead for the
//! loaded file and reports `Finished` when the playhead reaches the end.
//! Nothing is decoded or rendered.

use melos_core::{LoadId, MediaDecoder, MelosError, Result};
use melos_playback::DecoderEvents;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

pub struct HeadlessDecoder {
    events: DecoderEvents,
    durations: HashMap<PathBuf, f64>,
    loaded: Option<PathBuf>,
    load_id: LoadId,
    duration_secs: f64,
    /// Playhead when the clock was last started or stopped
    offset_secs: f64,
    /// Set while rendering
    started_at: Option<Instant>,
    finish_timer: Option<JoinHandle<()>>,
}

impl HeadlessDecoder {
    pub fn new(events: DecoderEvents) -> Self {
        Self {
            events,
            durations: HashMap::new(),
            loaded: None,
            load_id: LoadId::default(),
            duration_secs: 0.0,
            offset_secs: 0.0,
            started_at: None,
            finish_timer: None,
        }
    }

    /// Known durations by locator, used instead of probing the file
    #[must_use]
    pub fn with_durations(mut self, durations: impl IntoIterator<Item = (PathBuf, f64)>) -> Self {
        self.durations.extend(durations);
        self
    }

    pub fn loaded(&self) -> Option<&Path> {
        self.loaded.as_deref()
    }

    pub fn is_rendering(&self) -> bool {
        self.started_at.is_some()
    }

    fn probe_duration(&self, locator: &Path) -> f64 {
        if let Some(&secs) = self.durations.get(locator) {
            return secs;
        }
        match melos_storage::probe_file(locator) {
            Ok(probed) => probed.duration_secs,
            Err(e) => {
                tracing::debug!("No duration for {}: {}", locator.display(), e);
                0.0
            }
        }
    }

    fn start_clock(&mut self) {
        self.started_at = Some(Instant::now());
        self.arm_finish_timer();
    }

    fn stop_clock(&mut self) {
        self.offset_secs = self.elapsed();
        self.started_at = None;
        self.cancel_finish_timer();
    }

    fn arm_finish_timer(&mut self) {
        self.cancel_finish_timer();
        if self.duration_secs <= 0.0 {
            return;
        }

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("No async runtime, end of track will not be reported");
            return;
        };

        let remaining = Duration::from_secs_f64((self.duration_secs - self.offset_secs).max(0.0));
        let events = self.events.clone();
        let load_id = self.load_id;
        self.finish_timer = Some(runtime.spawn(async move {
            tokio::time::sleep(remaining).await;
            if !events.finished(load_id) {
                tracing::debug!("Track finished after the controller stopped");
            }
        }));
    }

    fn cancel_finish_timer(&mut self) {
        if let Some(timer) = self.finish_timer.take() {
            timer.abort();
        }
    }
}

impl MediaDecoder for HeadlessDecoder {
    fn load(&mut self, locator: &Path, load_id: LoadId) -> Result<()> {
        self.unload();

        if !locator.exists() {
            return Err(MelosError::audio(format!(
                "File not found: {}",
                locator.display()
            )));
        }

        self.duration_secs = self.probe_duration(locator);
        self.loaded = Some(locator.to_path_buf());
        self.load_id = load_id;
        tracing::debug!(
            "Loaded {} ({:.1}s)",
            locator.display(),
            self.duration_secs
        );
        Ok(())
    }

    fn play(&mut self) -> Result<()> {
        if self.loaded.is_none() {
            return Err(MelosError::audio("Nothing loaded"));
        }
        self.start_clock();
        Ok(())
    }

    fn pause(&mut self) {
        if self.started_at.is_some() {
            self.stop_clock();
        }
    }

    fn resume(&mut self) {
        if self.loaded.is_some() && self.started_at.is_none() {
            self.start_clock();
        }
    }

    fn seek(&mut self, position_secs: f64) {
        let upper = if self.duration_secs > 0.0 {
            self.duration_secs
        } else {
            f64::MAX
        };
        self.offset_secs = position_secs.clamp(0.0, upper);

        if self.started_at.is_some() {
            self.start_clock();
        }
    }

    fn unload(&mut self) {
        self.cancel_finish_timer();
        self.loaded = None;
        self.duration_secs = 0.0;
        self.offset_secs = 0.0;
        self.started_at = None;
    }

    fn elapsed(&self) -> f64 {
        let running = self
            .started_at
            .map_or(0.0, |started| started.elapsed().as_secs_f64());
        let elapsed = self.offset_secs + running;

        if self.duration_secs > 0.0 {
            elapsed.min(self.duration_secs)
        } else {
            elapsed
        }
    }

    fn duration(&self) -> f64 {
        self.duration_secs
    }
}

impl Drop for HeadlessDecoder {
    fn drop(&mut self) {
        self.cancel_finish_timer();
    }
}
