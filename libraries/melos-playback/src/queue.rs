//! Persistent playback queue
//!
//! An ordered list of entries plus a cursor. The cursor wraps at both ends
//! (continuous loop) and follows the current entry's identity across
//! removals and reorders elsewhere in the list.
//!
//! ```text
//!   [ A | B | C | A ]      entries (the same track may repeat)
//!         ^
//!     current_index
//! ```
//!
//! Every mutation saves the whole record through the `KeyValueStore` before
//! returning. Save failures are logged; the in-memory state is kept.

use crate::error::Result;
use melos_core::{keys, EntryId, KeyValueStore, MemoryStore, QueueEntry, TrackId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

/// Persisted form of the queue
///
/// ```json
/// { "items": [ { "entryID": "...", "trackID": "..." } ], "currentIndex": 0 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueStateRecord {
    /// Entries in playback order
    #[serde(default)]
    pub items: Vec<QueueEntry>,

    /// Cursor, signed so that a damaged record can be clamped on load
    #[serde(default)]
    pub current_index: i64,
}

/// Ordered queue of entries with a wrapping cursor
pub struct QueueEngine {
    entries: Vec<QueueEntry>,
    current_index: usize,
    store: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for QueueEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueueEngine")
            .field("entries", &self.entries)
            .field("current_index", &self.current_index)
            .finish_non_exhaustive()
    }
}

impl QueueEngine {
    /// Create an empty queue persisting to `store`
    ///
    /// Nothing is loaded; use [`QueueEngine::restore`] at startup.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            entries: Vec::new(),
            current_index: 0,
            store,
        }
    }

    /// Empty queue backed by a volatile store
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Load the queue saved in `store`
    ///
    /// A missing record gives an empty queue. An unreadable record gives an
    /// empty queue and a warning. An out-of-range cursor is clamped.
    pub fn restore(store: Arc<dyn KeyValueStore>) -> Self {
        let record = match store.load(keys::QUEUE) {
            Ok(Some(blob)) => match serde_json::from_slice::<QueueStateRecord>(&blob) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!("Queue record is corrupt, starting with an empty queue: {}", e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("Failed to load queue, starting with an empty queue: {}", e);
                None
            }
        };

        let mut queue = Self::new(store);
        if let Some(record) = record {
            let len = record.items.len();
            queue.current_index = if len == 0 {
                0
            } else {
                usize::try_from(record.current_index).map_or(0, |index| index.min(len - 1))
            };
            queue.entries = record.items;
            tracing::debug!(
                "Restored queue with {} entries at {}",
                queue.entries.len(),
                queue.current_index
            );
        }
        queue
    }

    // ===== Mutation =====

    /// Add a track at the end
    pub fn append(&mut self, track_id: TrackId) -> EntryId {
        let entry = QueueEntry::new(track_id);
        let id = entry.id;
        self.entries.push(entry);
        self.save();
        id
    }

    /// Add several tracks at the end, saving once
    pub fn append_many(&mut self, track_ids: impl IntoIterator<Item = TrackId>) -> Vec<EntryId> {
        let start = self.entries.len();
        self.entries.extend(track_ids.into_iter().map(QueueEntry::new));
        let ids = self.entries[start..].iter().map(|e| e.id).collect::<Vec<_>>();
        if !ids.is_empty() {
            self.save();
        }
        ids
    }

    /// Add a track right after the current entry
    pub fn insert_next(&mut self, track_id: TrackId) -> EntryId {
        let entry = QueueEntry::new(track_id);
        let id = entry.id;
        let at = (self.current_index + 1).min(self.entries.len());
        self.entries.insert(at, entry);
        self.save();
        id
    }

    /// Rebuild the queue from `track_ids` and point at `start_index`
    ///
    /// `start_index` is clamped into range.
    pub fn replace(&mut self, track_ids: impl IntoIterator<Item = TrackId>, start_index: usize) {
        self.entries = track_ids.into_iter().map(QueueEntry::new).collect();
        self.current_index = start_index.min(self.entries.len().saturating_sub(1));
        self.save();
    }

    /// Delete the entries at `indices`
    ///
    /// Indices may be unsorted or repeated; out-of-range ones are ignored.
    /// The cursor stays on the current entry if it survives, otherwise it
    /// keeps its numeric slot (clamped to the new end).
    pub fn remove(&mut self, indices: &[usize]) {
        let len = self.entries.len();
        let doomed: HashSet<usize> = indices.iter().copied().filter(|&i| i < len).collect();
        if doomed.is_empty() {
            tracing::debug!("Ignoring queue removal with no valid indices: {:?}", indices);
            return;
        }

        let current = self.current_entry().map(|e| e.id);
        let mut index = 0;
        self.entries.retain(|_| {
            let keep = !doomed.contains(&index);
            index += 1;
            keep
        });

        self.current_index = self.follow(current);
        self.save();
    }

    /// Move the entries at `from_indices` in front of the entry that was at
    /// `to_index`
    ///
    /// Moved entries keep their relative order; `to_index == len` moves them
    /// to the end. Out-of-range sources are ignored and `to_index` is clamped
    /// to `len`. The cursor stays on the same entry.
    pub fn move_entries(&mut self, from_indices: &[usize], to_index: usize) {
        let len = self.entries.len();
        let to_index = to_index.min(len);

        let mut sources: Vec<usize> = from_indices.iter().copied().filter(|&i| i < len).collect();
        sources.sort_unstable();
        sources.dedup();
        if sources.is_empty() {
            tracing::debug!("Ignoring queue move with no valid sources: {:?}", from_indices);
            return;
        }

        let current = self.current_entry().map(|e| e.id);

        // Position of the destination once the moved entries are taken out
        let insert_at = to_index - sources.iter().filter(|&&i| i < to_index).count();

        let mut moved = Vec::with_capacity(sources.len());
        let mut rest = Vec::with_capacity(len - sources.len());
        for (i, entry) in self.entries.drain(..).enumerate() {
            if sources.binary_search(&i).is_ok() {
                moved.push(entry);
            } else {
                rest.push(entry);
            }
        }
        rest.splice(insert_at..insert_at, moved);
        self.entries = rest;

        self.current_index = self.follow(current);
        self.save();
    }

    /// Empty the queue
    pub fn clear(&mut self) {
        self.entries.clear();
        self.current_index = 0;
        self.save();
    }

    // ===== Navigation =====

    /// Step forward, wrapping from the last entry to the first
    ///
    /// Returns false only when the queue is empty.
    pub fn advance(&mut self) -> bool {
        if self.entries.is_empty() {
            return false;
        }

        self.current_index = if self.current_index + 1 < self.entries.len() {
            self.current_index + 1
        } else {
            0
        };
        self.save();
        true
    }

    /// Step back, wrapping from the first entry to the last
    ///
    /// Returns false only when the queue is empty.
    pub fn rewind(&mut self) -> bool {
        if self.entries.is_empty() {
            return false;
        }

        self.current_index = if self.current_index > 0 {
            self.current_index - 1
        } else {
            self.entries.len() - 1
        };
        self.save();
        true
    }

    /// Point the cursor at `index`; out-of-range indices are ignored
    ///
    /// Returns whether the cursor was set.
    pub fn jump_to(&mut self, index: usize) -> bool {
        if index >= self.entries.len() {
            tracing::debug!("Ignoring jump to {} (queue length {})", index, self.entries.len());
            return false;
        }

        self.current_index = index;
        self.save();
        true
    }

    // ===== Queries =====

    /// Entry under the cursor
    pub fn current_entry(&self) -> Option<&QueueEntry> {
        self.entries.get(self.current_index)
    }

    /// Cursor position (0 when empty)
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// All entries in playback order
    pub fn entries(&self) -> &[QueueEntry] {
        &self.entries
    }

    /// Entry at `index`
    pub fn get(&self, index: usize) -> Option<&QueueEntry> {
        self.entries.get(index)
    }

    /// Position of the entry with identity `id`
    pub fn position_of(&self, id: EntryId) -> Option<usize> {
        self.entries.iter().position(|e| e.id == id)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the queue is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Snapshot in persisted form
    pub fn to_record(&self) -> QueueStateRecord {
        QueueStateRecord {
            items: self.entries.clone(),
            current_index: self.current_index as i64,
        }
    }

    /// Write the record now and report failure
    ///
    /// Mutations already save on their own and only log failures; callers
    /// that must know the state reached the store use this.
    pub fn try_save(&self) -> Result<()> {
        let blob = serde_json::to_vec(&self.to_record())?;
        self.store.save(keys::QUEUE, &blob)?;
        Ok(())
    }

    // ===== Internal =====

    /// Cursor after a structural change, following `current` when present
    fn follow(&self, current: Option<EntryId>) -> usize {
        current
            .and_then(|id| self.position_of(id))
            .unwrap_or_else(|| self.current_index.min(self.entries.len().saturating_sub(1)))
    }

    fn save(&self) {
        if let Err(e) = self.try_save() {
            tracing::warn!("Failed to save queue, keeping in-memory state: {}", e);
        }
    }
}
