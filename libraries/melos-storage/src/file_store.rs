//! File-backed key→blob store

use crate::error::{Result, StorageError};
use melos_core::KeyValueStore;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Stores each key as `<dir>/<key>.json`
///
/// Writes go to a temporary sibling first and are renamed over the target,
/// so a crash mid-write leaves the previous document intact.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `dir` (created lazily on first save)
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the documents
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the document for `key`
    pub fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
            && !key.starts_with('.');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }

    fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(key)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, key: &str, blob: &[u8]) -> Result<()> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir)?;

        let tmp = path.with_extension("json.tmp");
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(blob)?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &path)?;

        tracing::trace!("Saved {} ({} bytes)", path.display(), blob.len());
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn load(&self, key: &str) -> melos_core::Result<Option<Vec<u8>>> {
        Ok(self.read(key)?)
    }

    fn save(&self, key: &str, blob: &[u8]) -> melos_core::Result<()> {
        Ok(self.write(key, blob)?)
    }
}
