//! Shared fixtures for CLI tests
#![allow(dead_code)]

use melos_cli::{MelosConfig, Workspace};
use melos_core::TrackId;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub struct TestWorkspace {
    pub ws: Workspace,
    pub config: MelosConfig,
    // Keeps the directory alive for the test
    _dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let mut config = MelosConfig::default();
        config.storage.data_dir = dir.path().join("data");
        config.storage.library_root = Some(dir.path().join("music"));
        std::fs::create_dir_all(dir.path().join("music")).unwrap();

        Self {
            ws: Workspace::open(&config),
            config,
            _dir: dir,
        }
    }

    pub fn music_dir(&self) -> &Path {
        self.config.library_root()
    }

    /// Write a placeholder audio file under the library root
    pub fn write_file(&self, file_name: &str) -> PathBuf {
        let path = self.music_dir().join(file_name);
        std::fs::write(&path, b"not really audio").unwrap();
        path
    }

    /// Register a track with a known duration, backed by a placeholder file
    pub fn add_track(&self, title: &str, duration_secs: f64) -> TrackId {
        let file_name = format!("{}.mp3", title.to_lowercase());
        self.write_file(&file_name);
        self.ws
            .library
            .import(title, file_name.clone(), file_name, duration_secs)
            .unwrap()
            .id
    }

    /// Reopen the persisted state, as the next CLI invocation would
    pub fn reopen(&self) -> Workspace {
        Workspace::open(&self.config)
    }
}

pub fn output(buf: Vec<u8>) -> String {
    String::from_utf8(buf).unwrap()
}
