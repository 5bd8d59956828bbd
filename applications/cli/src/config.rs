/// CLI configuration
use crate::error::{CliError, Result};
use melos_core::AppSettings;
use melos_playback::PlaybackConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Config file picked up from the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "melos.toml";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MelosConfig {
    #[serde(default = "default_storage")]
    pub storage: StorageSettings,

    #[serde(default = "default_playback")]
    pub playback: PlaybackSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageSettings {
    /// Where the queue, library manifest and settings are kept
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Directory imported files are stored relative to (defaults to `data_dir`)
    #[serde(default)]
    pub library_root: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlaybackSettings {
    #[serde(default = "default_progress_interval_ms")]
    pub progress_interval_ms: u64,

    #[serde(default = "default_double_tap_window_ms")]
    pub double_tap_window_ms: u64,
}

impl MelosConfig {
    /// Load configuration from file and environment
    ///
    /// An explicit `path` must exist; otherwise `melos.toml` is read if
    /// present. `MELOS_`-prefixed variables override both, with `__`
    /// between nested keys (`MELOS_STORAGE__DATA_DIR`).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path).required(true));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        settings = settings.add_source(
            config::Environment::with_prefix("MELOS")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = settings.build()?.try_deserialize()?;
        tracing::debug!("Loaded configuration: {:?}", config);
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.playback.progress_interval_ms == 0 {
            return Err(CliError::Config(
                "playback.progress_interval_ms must be greater than zero".to_string(),
            ));
        }

        if self.playback.double_tap_window_ms == 0 {
            return Err(CliError::Config(
                "playback.double_tap_window_ms must be greater than zero".to_string(),
            ));
        }

        if self.storage.data_dir.as_os_str().is_empty() {
            return Err(CliError::Config(
                "storage.data_dir must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    pub fn library_root(&self) -> &Path {
        self.storage
            .library_root
            .as_deref()
            .unwrap_or(&self.storage.data_dir)
    }

    /// Engine timings combined with the user's persisted settings
    pub fn playback_config(&self, settings: &AppSettings) -> PlaybackConfig {
        PlaybackConfig {
            skip_interval_secs: settings.skip_interval_secs,
            double_tap_window: Duration::from_millis(self.playback.double_tap_window_ms),
            progress_interval: Duration::from_millis(self.playback.progress_interval_ms),
        }
    }
}

impl Default for MelosConfig {
    fn default() -> Self {
        Self {
            storage: default_storage(),
            playback: default_playback(),
        }
    }
}

// Default values
fn default_storage() -> StorageSettings {
    StorageSettings {
        data_dir: default_data_dir(),
        library_root: None,
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_playback() -> PlaybackSettings {
    PlaybackSettings {
        progress_interval_ms: default_progress_interval_ms(),
        double_tap_window_ms: default_double_tap_window_ms(),
    }
}

fn default_progress_interval_ms() -> u64 {
    250
}

fn default_double_tap_window_ms() -> u64 {
    400
}
