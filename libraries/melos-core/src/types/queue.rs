/// Queue entry domain type
use crate::types::{EntryId, TrackId};
use serde::{Deserialize, Serialize};

/// One slot in the playback queue
///
/// Immutable once created: queue mutations insert, drop or reorder whole
/// entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueEntry {
    /// Identity of this slot
    #[serde(rename = "entryID")]
    pub id: EntryId,

    /// Track this slot plays
    #[serde(rename = "trackID")]
    pub track_id: TrackId,
}

impl QueueEntry {
    /// Create an entry with a fresh identity
    pub fn new(track_id: TrackId) -> Self {
        Self {
            id: EntryId::generate(),
            track_id,
        }
    }
}
