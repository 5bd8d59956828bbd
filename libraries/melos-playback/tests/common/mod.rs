//! Shared test doubles for integration tests

#![allow(dead_code)]

use melos_core::{
    KeyValueStore, LoadId, MediaDecoder, MelosError, Track, TrackCatalog, TrackId,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};

/// Calls seen by [`RecordingDecoder`]
#[derive(Debug, Clone, PartialEq)]
pub enum DecoderCall {
    Load(PathBuf),
    Play,
    Pause,
    Resume,
    Seek(f64),
    Unload,
}

#[derive(Debug, Default)]
struct DecoderState {
    calls: Vec<DecoderCall>,
    load_id: LoadId,
    elapsed: f64,
    duration: f64,
    reported_duration: f64,
    fail_loads: bool,
}

/// Decoder that records every call and never renders anything
#[derive(Debug, Clone, Default)]
pub struct RecordingDecoder {
    state: Arc<Mutex<DecoderState>>,
}

impl RecordingDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<DecoderCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn set_reported_duration(&self, secs: f64) {
        self.state.lock().unwrap().reported_duration = secs;
    }

    pub fn fail_loads(&self, fail: bool) {
        self.state.lock().unwrap().fail_loads = fail;
    }

    pub fn set_elapsed(&self, secs: f64) {
        self.state.lock().unwrap().elapsed = secs;
    }

    /// Paths passed to `load`, in order
    pub fn loads(&self) -> Vec<PathBuf> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                DecoderCall::Load(path) => Some(path),
                _ => None,
            })
            .collect()
    }

    /// Load id passed to the most recent `load`
    pub fn last_load_id(&self) -> LoadId {
        self.state.lock().unwrap().load_id
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }
}

impl MediaDecoder for RecordingDecoder {
    fn load(&mut self, locator: &Path, load_id: LoadId) -> melos_core::Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(DecoderCall::Load(locator.to_path_buf()));
        state.load_id = load_id;
        if state.fail_loads {
            return Err(MelosError::audio("unsupported file"));
        }
        state.elapsed = 0.0;
        state.duration = state.reported_duration;
        Ok(())
    }

    fn play(&mut self) -> melos_core::Result<()> {
        self.state.lock().unwrap().calls.push(DecoderCall::Play);
        Ok(())
    }

    fn pause(&mut self) {
        self.state.lock().unwrap().calls.push(DecoderCall::Pause);
    }

    fn resume(&mut self) {
        self.state.lock().unwrap().calls.push(DecoderCall::Resume);
    }

    fn seek(&mut self, position_secs: f64) {
        let mut state = self.state.lock().unwrap();
        state.calls.push(DecoderCall::Seek(position_secs));
        state.elapsed = position_secs;
    }

    fn unload(&mut self) {
        let mut state = self.state.lock().unwrap();
        state.calls.push(DecoderCall::Unload);
        state.elapsed = 0.0;
        state.duration = 0.0;
    }

    fn elapsed(&self) -> f64 {
        self.state.lock().unwrap().elapsed
    }

    fn duration(&self) -> f64 {
        self.state.lock().unwrap().duration
    }
}

/// In-memory catalog rooted at `/music`
///
/// Tracks can be deleted while a session holds the catalog.
#[derive(Debug, Default)]
pub struct StaticCatalog {
    tracks: RwLock<HashMap<TrackId, Track>>,
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
        Self {
            tracks: RwLock::new(tracks),
        }
    }

    /// Add or replace a track as-is, bypassing any sanitizing
    pub fn insert(&self, track: Track) {
        self.tracks.write().unwrap().insert(track.id.clone(), track);
    }

    pub fn remove(&self, id: &str) {
        self.tracks.write().unwrap().remove(&TrackId::new(id));
    }
}

impl TrackCatalog for StaticCatalog {
    fn resolve(&self, id: &TrackId) -> Option<Track> {
        self.tracks.read().unwrap().get(id).cloned()
    }

    fn locator(&self, track: &Track) -> PathBuf {
        Path::new("/music").join(&track.relative_path)
    }
}

/// Store whose writes always fail
#[derive(Debug, Default)]
pub struct FailingStore;

impl KeyValueStore for FailingStore {
    fn load(&self, _key: &str) -> melos_core::Result<Option<Vec<u8>>> {
        Err(MelosError::storage("disk unavailable"))
    }

    fn save(&self, _key: &str, _blob: &[u8]) -> melos_core::Result<()> {
        Err(MelosError::storage("disk unavailable"))
    }
}

/// Track locator as produced by [`StaticCatalog`]
pub fn locator(id: &str) -> PathBuf {
    Path::new("/music").join(format!("{id}.mp3"))
}
