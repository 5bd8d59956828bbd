/// Collaborator traits for Melos
use crate::error::Result;
use crate::types::{LoadId, Track, TrackId};
use std::path::{Path, PathBuf};

/// Read-only access to the track catalog
///
/// The playback engine only ever resolves tracks; importing and deleting
/// belong to the catalog implementation.
pub trait TrackCatalog: Send + Sync {
    /// Resolve a track by ID
    ///
    /// Returns `None` when the track was deleted from the catalog. Callers
    /// must treat that as recoverable.
    fn resolve(&self, id: &TrackId) -> Option<Track>;

    /// Absolute locator of the track's audio file
    fn locator(&self, track: &Track) -> PathBuf;
}

/// Audio decoder/output device
///
/// Implementers decode and render one file at a time. Completion is not
/// reported through this trait: the driver delivers a "finished" event to
/// the controller that owns the session.
pub trait MediaDecoder: Send {
    /// Load a file, replacing whatever was loaded before
    ///
    /// `load_id` identifies this load; end-of-track and decode-error
    /// reports for the file must carry it.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or decoded
    fn load(&mut self, locator: &Path, load_id: LoadId) -> Result<()>;

    /// Start rendering the loaded file
    ///
    /// # Errors
    /// Returns an error if the output device refuses to start
    fn play(&mut self) -> Result<()>;

    /// Pause rendering
    fn pause(&mut self);

    /// Resume rendering after a pause
    fn resume(&mut self);

    /// Move the playhead (seconds from start)
    fn seek(&mut self, position_secs: f64);

    /// Release the loaded file and the output resource
    fn unload(&mut self);

    /// Current playhead in seconds
    fn elapsed(&self) -> f64;

    /// Total duration in seconds (0 until a file is loaded)
    fn duration(&self) -> f64;
}
