/// ID types for Melos entities
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Track identifier
///
/// Catalog identities are opaque strings (UUIDs for imported tracks).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(String);

impl TrackId {
    /// Create a new track ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a new random track ID
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TrackId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Queue entry identifier
///
/// One per queue slot, so the same track can be queued several times and
/// each occurrence is still distinguishable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(Uuid);

impl EntryId {
    /// Generate a new random entry ID
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the inner UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Generation of a decoder load
///
/// The session hands a fresh one to the decoder on every load; completion
/// reports carry it back so reports from an earlier load can be dropped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LoadId(u64);

impl LoadId {
    /// The generation following this one
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    /// Get the raw counter value
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for LoadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_id_generation_creates_unique_ids() {
        let id1 = EntryId::generate();
        let id2 = EntryId::generate();
        assert_ne!(id1, id2);
    }

    #[test]
    fn track_id_from_string() {
        let id = TrackId::new("track-123");
        assert_eq!(id.as_str(), "track-123");
    }

    #[test]
    fn track_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&TrackId::new("t1")).unwrap();
        assert_eq!(json, "\"t1\"");
    }

    #[test]
    fn load_id_moves_forward() {
        let first = LoadId::default();
        let second = first.next();
        assert_ne!(first, second);
        assert_eq!(second.as_u64(), 1);
    }
}
