//! Track library
//!
//! Flat catalog of imported tracks, persisted as a JSON array under
//! `keys::LIBRARY`. Color tags are handed out round-robin.

use crate::error::Result;
use crate::probe::probe_file;
use melos_core::{keys, KeyValueStore, Track, TrackCatalog, TrackColor, TrackId};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

#[derive(Debug, Default)]
struct Catalog {
    tracks: Vec<Track>,
    next_color: usize,
}

/// Persistent track catalog
///
/// Shared between the playback engine (read-only, through `TrackCatalog`)
/// and whatever surface imports and deletes tracks.
pub struct Library {
    store: Arc<dyn KeyValueStore>,
    root: PathBuf,
    catalog: RwLock<Catalog>,
}

impl Library {
    /// Open the library stored in `store`
    ///
    /// A missing or unreadable manifest yields an empty library.
    pub fn open(store: Arc<dyn KeyValueStore>, root: impl Into<PathBuf>) -> Self {
        let tracks = match store.load(keys::LIBRARY) {
            Ok(Some(blob)) => match serde_json::from_slice::<Vec<Track>>(&blob) {
                Ok(tracks) => tracks,
                Err(e) => {
                    tracing::warn!("Library manifest is corrupt, starting empty: {}", e);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!("Failed to load library manifest, starting empty: {}", e);
                Vec::new()
            }
        };

        let next_color = tracks.len() % TrackColor::ALL.len();
        tracing::debug!("Library opened with {} tracks", tracks.len());

        Self {
            store,
            root: root.into(),
            catalog: RwLock::new(Catalog { tracks, next_color }),
        }
    }

    /// Directory that relative paths resolve against
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Register a track and persist the manifest
    pub fn import(
        &self,
        title: impl Into<String>,
        file_name: impl Into<String>,
        relative_path: impl Into<String>,
        duration_secs: f64,
    ) -> Result<Track> {
        let mut catalog = self.catalog.write().unwrap_or_else(PoisonError::into_inner);

        let track = Track::new(title, file_name, relative_path)
            .with_duration(duration_secs)
            .with_color(TrackColor::for_index(catalog.next_color));
        catalog.next_color = (catalog.next_color + 1) % TrackColor::ALL.len();
        catalog.tracks.push(track.clone());

        self.persist(&catalog.tracks)?;
        tracing::info!("Imported {:?} ({})", track.title, track.id);
        Ok(track)
    }

    /// Probe an audio file in place and register it
    ///
    /// Files under the library root are stored relative to it; anything
    /// else keeps its absolute path.
    pub fn import_file(&self, path: &Path) -> Result<Track> {
        let probed = probe_file(path)?;
        let relative = path
            .strip_prefix(&self.root)
            .unwrap_or(path)
            .to_string_lossy()
            .into_owned();

        self.import(
            probed.title,
            probed.file_name,
            relative,
            probed.duration_secs,
        )
    }

    /// Delete a track, returns true if it existed
    pub fn remove(&self, id: &TrackId) -> Result<bool> {
        let mut catalog = self.catalog.write().unwrap_or_else(PoisonError::into_inner);
        let before = catalog.tracks.len();
        catalog.tracks.retain(|t| &t.id != id);

        if catalog.tracks.len() == before {
            return Ok(false);
        }
        self.persist(&catalog.tracks)?;
        Ok(true)
    }

    /// Delete several tracks, returns how many existed
    pub fn remove_many(&self, ids: &[TrackId]) -> Result<usize> {
        let ids: HashSet<&TrackId> = ids.iter().collect();
        let mut catalog = self.catalog.write().unwrap_or_else(PoisonError::into_inner);
        let before = catalog.tracks.len();
        catalog.tracks.retain(|t| !ids.contains(&t.id));

        let removed = before - catalog.tracks.len();
        if removed > 0 {
            self.persist(&catalog.tracks)?;
        }
        Ok(removed)
    }

    /// Look a track up by ID
    pub fn get(&self, id: &TrackId) -> Option<Track> {
        let catalog = self.catalog.read().unwrap_or_else(PoisonError::into_inner);
        catalog.tracks.iter().find(|t| &t.id == id).cloned()
    }

    /// All tracks in import order
    pub fn tracks(&self) -> Vec<Track> {
        let catalog = self.catalog.read().unwrap_or_else(PoisonError::into_inner);
        catalog.tracks.clone()
    }

    /// All tracks, newest import first
    pub fn sorted_by_import(&self) -> Vec<Track> {
        let mut tracks = self.tracks();
        tracks.sort_by(|a, b| b.imported_at.cmp(&a.imported_at));
        tracks
    }

    /// Number of tracks
    pub fn len(&self) -> usize {
        let catalog = self.catalog.read().unwrap_or_else(PoisonError::into_inner);
        catalog.tracks.len()
    }

    /// Whether the library is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn persist(&self, tracks: &[Track]) -> Result<()> {
        let blob = serde_json::to_vec_pretty(tracks)?;
        self.store.save(keys::LIBRARY, &blob)?;
        Ok(())
    }
}

impl TrackCatalog for Library {
    fn resolve(&self, id: &TrackId) -> Option<Track> {
        self.get(id)
    }

    fn locator(&self, track: &Track) -> PathBuf {
        self.root.join(&track.relative_path)
    }
}
