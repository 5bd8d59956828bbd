//! User settings persistence
//!
//! Settings are stored as one JSON document under `keys::SETTINGS`.

use crate::error::Result;
use melos_core::{keys, AppSettings, KeyValueStore};

/// Load settings, falling back to defaults when absent or unreadable
pub fn load(store: &dyn KeyValueStore) -> AppSettings {
    match store.load(keys::SETTINGS) {
        Ok(Some(blob)) => match serde_json::from_slice::<AppSettings>(&blob) {
            Ok(settings) => settings.normalized(),
            Err(e) => {
                tracing::warn!("Settings document is corrupt, using defaults: {}", e);
                AppSettings::default()
            }
        },
        Ok(None) => AppSettings::default(),
        Err(e) => {
            tracing::warn!("Failed to load settings, using defaults: {}", e);
            AppSettings::default()
        }
    }
}

/// Persist settings
pub fn save(store: &dyn KeyValueStore, settings: &AppSettings) -> Result<()> {
    let blob = serde_json::to_vec_pretty(settings)?;
    store.save(keys::SETTINGS, &blob)?;
    Ok(())
}
