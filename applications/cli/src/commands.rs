//! Library, queue and settings subcommands
//!
//! Every command opens the persisted state, applies one change and
//! returns; output goes to the given writer.

use crate::config::MelosConfig;
use crate::error::{CliError, Result};
use melos_core::{AppSettings, TrackId};
use melos_playback::QueueEngine;
use melos_storage::{settings, FileStore, Library};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

/// Persisted state shared by all commands
pub struct Workspace {
    pub store: Arc<FileStore>,
    pub library: Arc<Library>,
}

impl Workspace {
    pub fn open(config: &MelosConfig) -> Self {
        let store = Arc::new(FileStore::new(config.storage.data_dir.clone()));
        let library = Arc::new(Library::open(store.clone(), config.library_root()));
        tracing::debug!(
            "Workspace at {} ({} tracks)",
            store.dir().display(),
            library.len()
        );
        Self { store, library }
    }

    pub fn queue(&self) -> QueueEngine {
        QueueEngine::restore(self.store.clone())
    }

    pub fn settings(&self) -> AppSettings {
        settings::load(self.store.as_ref())
    }

    fn title_of(&self, id: &TrackId) -> String {
        self.library
            .get(id)
            .map_or_else(|| "<missing>".to_string(), |t| t.title)
    }

    fn require_tracks(&self, ids: &[String]) -> Result<Vec<TrackId>> {
        ids.iter()
            .map(|id| {
                let id = TrackId::new(id.as_str());
                if self.library.get(&id).is_some() {
                    Ok(id)
                } else {
                    Err(CliError::UnknownTrack(id.to_string()))
                }
            })
            .collect()
    }
}

/// `m:ss` for display
pub fn format_time(secs: f64) -> String {
    let secs = if secs.is_finite() { secs.max(0.0) } else { 0.0 };
    let total = secs as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

// ===== Library =====

pub fn library_list(ws: &Workspace, json: bool, out: &mut impl Write) -> Result<()> {
    let tracks = ws.library.sorted_by_import();

    if json {
        serde_json::to_writer_pretty(&mut *out, &tracks)?;
        writeln!(out)?;
        return Ok(());
    }

    if tracks.is_empty() {
        writeln!(out, "Library is empty")?;
        return Ok(());
    }

    for track in &tracks {
        writeln!(
            out,
            "{}  {:>6}  {}",
            track.id,
            format_time(track.duration_secs),
            track.title
        )?;
    }
    Ok(())
}

pub fn library_import(ws: &Workspace, paths: &[PathBuf], out: &mut impl Write) -> Result<()> {
    for path in paths {
        let track = ws.library.import_file(path)?;
        writeln!(out, "Imported {} ({})", track.title, track.id)?;
    }
    Ok(())
}

/// Remove tracks from the library
///
/// Queue entries pointing at them stay; playback skips them.
pub fn library_remove(ws: &Workspace, ids: &[String], out: &mut impl Write) -> Result<()> {
    let ids: Vec<TrackId> = ids.iter().map(|id| TrackId::new(id.as_str())).collect();
    let removed = ws.library.remove_many(&ids)?;
    writeln!(out, "Removed {} of {} track(s)", removed, ids.len())?;
    Ok(())
}

// ===== Queue =====

pub fn queue_show(ws: &Workspace, out: &mut impl Write) -> Result<()> {
    let queue = ws.queue();

    if queue.is_empty() {
        writeln!(out, "Queue is empty")?;
        return Ok(());
    }

    for (index, entry) in queue.entries().iter().enumerate() {
        let marker = if index == queue.current_index() { '>' } else { ' ' };
        writeln!(
            out,
            "{} {:>3}  {}  ({})",
            marker,
            index,
            ws.title_of(&entry.track_id),
            entry.track_id
        )?;
    }
    Ok(())
}

/// Queue tracks at the end, or right after the current entry with `next`
pub fn queue_add(ws: &Workspace, ids: &[String], next: bool, out: &mut impl Write) -> Result<()> {
    let track_ids = ws.require_tracks(ids)?;
    let count = track_ids.len();
    let mut queue = ws.queue();

    if next {
        // Inserting in reverse keeps the given order after the current entry
        for id in track_ids.into_iter().rev() {
            queue.insert_next(id);
        }
    } else {
        queue.append_many(track_ids);
    }
    queue.try_save()?;

    writeln!(out, "Queued {} track(s), queue has {}", count, queue.len())?;
    Ok(())
}

pub fn queue_remove(ws: &Workspace, indices: &[usize], out: &mut impl Write) -> Result<()> {
    let mut queue = ws.queue();
    let before = queue.len();
    queue.remove(indices);
    queue.try_save()?;

    writeln!(out, "Removed {} queue entries", before - queue.len())?;
    Ok(())
}

pub fn queue_move(ws: &Workspace, from: &[usize], to: usize, out: &mut impl Write) -> Result<()> {
    let mut queue = ws.queue();
    queue.move_entries(from, to);
    queue.try_save()?;
    queue_show(ws, out)
}

pub fn queue_jump(ws: &Workspace, index: usize, out: &mut impl Write) -> Result<()> {
    let mut queue = ws.queue();
    if !queue.jump_to(index) {
        return Err(CliError::InvalidPosition {
            index,
            len: queue.len(),
        });
    }
    queue.try_save()?;

    let title = queue
        .current_entry()
        .map(|entry| ws.title_of(&entry.track_id))
        .unwrap_or_default();
    writeln!(out, "Current entry is now {} ({})", index, title)?;
    Ok(())
}

pub fn queue_clear(ws: &Workspace, out: &mut impl Write) -> Result<()> {
    let mut queue = ws.queue();
    queue.clear();
    queue.try_save()?;
    writeln!(out, "Queue cleared")?;
    Ok(())
}

/// Check that `index` addresses an entry of the persisted queue
pub fn check_position(ws: &Workspace, index: usize) -> Result<()> {
    let len = ws.queue().len();
    if index < len {
        Ok(())
    } else {
        Err(CliError::InvalidPosition { index, len })
    }
}

// ===== Settings =====

pub fn settings_show(ws: &Workspace, out: &mut impl Write) -> Result<()> {
    let settings = ws.settings();
    writeln!(out, "Skip interval: {}s", settings.skip_interval_secs)?;
    Ok(())
}

pub fn settings_set_skip(ws: &Workspace, secs: u32, out: &mut impl Write) -> Result<()> {
    if !AppSettings::is_valid_skip_interval(secs) {
        return Err(CliError::InvalidSkipInterval(secs));
    }

    settings::save(ws.store.as_ref(), &AppSettings::with_skip_interval(secs))?;

    tracing::info!("Skip interval set to {}s", secs);
    writeln!(out, "Skip interval: {}s", secs)?;
    Ok(())
}
