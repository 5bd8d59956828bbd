//! Minimal doubles for the session unit tests
//!
//! The integration tests carry a fuller set under `tests/common`.

use melos_core::{LoadId, MediaDecoder, MelosError, Track, TrackCatalog, TrackId};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct DecoderState {
    seeks: Vec<f64>,
    duration: f64,
    reported_duration: f64,
    fail_loads: bool,
}

/// Decoder that remembers seeks and reports a configurable duration
#[derive(Debug, Clone, Default)]
pub struct RecordingDecoder {
    state: Arc<Mutex<DecoderState>>,
}

impl RecordingDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeks(&self) -> Vec<f64> {
        self.state.lock().unwrap().seeks.clone()
    }

    pub fn set_reported_duration(&self, secs: f64) {
        self.state.lock().unwrap().reported_duration = secs;
    }

    pub fn fail_loads(&self, fail: bool) {
        self.state.lock().unwrap().fail_loads = fail;
    }
}

impl MediaDecoder for RecordingDecoder {
    fn load(&mut self, _locator: &Path, _load_id: LoadId) -> melos_core::Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_loads {
            return Err(MelosError::audio("unsupported file"));
        }
        state.duration = state.reported_duration;
        Ok(())
    }

    fn play(&mut self) -> melos_core::Result<()> {
        Ok(())
    }

    fn pause(&mut self) {}

    fn resume(&mut self) {}

    fn seek(&mut self, position_secs: f64) {
        self.state.lock().unwrap().seeks.push(position_secs);
    }

    fn unload(&mut self) {
        self.state.lock().unwrap().duration = 0.0;
    }

    fn elapsed(&self) -> f64 {
        0.0
    }

    fn duration(&self) -> f64 {
        self.state.lock().unwrap().duration
    }
}

/// Fixed catalog rooted at `/music`
#[derive(Debug, Default)]
pub struct StaticCatalog {
    tracks: HashMap<TrackId, Track>,
}

impl StaticCatalog {
    pub fn with_tracks(tracks: &[(&str, f64)]) -> Self {
        let tracks = tracks
            .iter()
            .map(|&(id, duration)| {
                let mut track = Track::new(id.to_uppercase(), format!("{id}.mp3"), format!("{id}.mp3"))
                    .with_duration(duration);
                track.id = TrackId::new(id);
                (track.id.clone(), track)
            })
            .collect();
        Self { tracks }
    }
}

impl TrackCatalog for StaticCatalog {
    fn resolve(&self, id: &TrackId) -> Option<Track> {
        self.tracks.get(id).cloned()
    }

    fn locator(&self, track: &Track) -> PathBuf {
        Path::new("/music").join(&track.relative_path)
    }
}
