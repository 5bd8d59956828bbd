//! Persistence backend trait
//!
//! Durable key→blob storage. The queue engine, the library catalog and the
//! settings all persist through it, each under its own key.

use crate::error::Result;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// Well-known storage keys
pub mod keys {
    /// Queue entries and cursor
    pub const QUEUE: &str = "queue";

    /// Library manifest
    pub const LIBRARY: &str = "library";

    /// User settings
    pub const SETTINGS: &str = "settings";
}

/// Durable key→blob storage
///
/// `save` must not return before the blob is durable (or has failed), so
/// that a successful mutation survives a crash right after it.
pub trait KeyValueStore: Send + Sync {
    /// Load a blob, `Ok(None)` if the key was never written
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Replace the blob stored under `key`
    fn save(&self, key: &str, blob: &[u8]) -> Result<()>;
}

/// Volatile store for tests and headless runs
#[derive(Debug, Default)]
pub struct MemoryStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys written so far
    pub fn len(&self) -> usize {
        self.blobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether nothing has been written
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let blobs = self.blobs.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(blobs.get(key).cloned())
    }

    fn save(&self, key: &str, blob: &[u8]) -> Result<()> {
        let mut blobs = self.blobs.lock().unwrap_or_else(PoisonError::into_inner);
        blobs.insert(key.to_string(), blob.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_returns_last_saved_blob() {
        let store = MemoryStore::new();
        assert!(store.load("queue").unwrap().is_none());

        store.save("queue", b"one").unwrap();
        store.save("queue", b"two").unwrap();

        assert_eq!(store.load("queue").unwrap().as_deref(), Some(&b"two"[..]));
        assert_eq!(store.len(), 1);
    }
}
