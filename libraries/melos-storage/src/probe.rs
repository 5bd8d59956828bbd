/// Title/duration probing using lofty
use crate::error::{Result, StorageError};
use lofty::{Accessor, AudioFile, TaggedFileExt};
use std::path::Path;

/// What the importer needs to know about a file
#[derive(Debug, Clone, PartialEq)]
pub struct ProbedFile {
    /// Tag title, or the file stem when untagged
    pub title: String,

    /// File name including extension
    pub file_name: String,

    /// Duration in seconds (0 when the container does not report one)
    pub duration_secs: f64,
}

/// Read title and duration from an audio file
pub fn probe_file(path: &Path) -> Result<ProbedFile> {
    if !path.exists() {
        return Err(StorageError::Probe(format!(
            "File not found: {}",
            path.display()
        )));
    }

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string();

    match lofty::read_from_path(path) {
        Ok(tagged_file) => {
            let duration_secs = tagged_file.properties().duration().as_secs_f64();
            let title = tagged_file
                .primary_tag()
                .and_then(|tag| tag.title().map(|t| t.to_string()))
                .filter(|t| !t.trim().is_empty())
                .unwrap_or(stem);

            Ok(ProbedFile {
                title,
                file_name,
                duration_secs,
            })
        }
        Err(e) => {
            tracing::warn!("Failed to read metadata from {}: {}", path.display(), e);
            Ok(ProbedFile {
                title: stem,
                file_name,
                duration_secs: 0.0,
            })
        }
    }
}
