/// User settings
use serde::{Deserialize, Serialize};

/// Persisted user settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    /// Seconds jumped by skip forward/backward
    #[serde(default = "default_skip_interval")]
    pub skip_interval_secs: u32,
}

fn default_skip_interval() -> u32 {
    AppSettings::DEFAULT_SKIP_INTERVAL_SECS
}

impl AppSettings {
    /// Default skip interval
    pub const DEFAULT_SKIP_INTERVAL_SECS: u32 = 15;

    /// Skip intervals offered to the user
    pub const SKIP_INTERVAL_OPTIONS: [u32; 4] = [5, 10, 15, 30];

    /// Settings with a given skip interval, normalized
    pub fn with_skip_interval(secs: u32) -> Self {
        Self {
            skip_interval_secs: secs,
        }
        .normalized()
    }

    /// Replace values outside the offered options with defaults
    #[must_use]
    pub fn normalized(self) -> Self {
        if Self::SKIP_INTERVAL_OPTIONS.contains(&self.skip_interval_secs) {
            self
        } else {
            Self::default()
        }
    }

    /// Whether `secs` is one of the offered skip intervals
    pub fn is_valid_skip_interval(secs: u32) -> bool {
        Self::SKIP_INTERVAL_OPTIONS.contains(&secs)
    }
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            skip_interval_secs: Self::DEFAULT_SKIP_INTERVAL_SECS,
        }
    }
}
