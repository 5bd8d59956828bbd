/// Track domain type
use crate::types::TrackId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Color tag shown next to a track
///
/// Assigned round-robin on import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TrackColor {
    /// First tag handed out
    #[default]
    LightOrange,
    /// Muted blue-violet
    Periwinkle,
    /// Pale yellow
    LightYellow,
    /// Warm clay
    SoftTerracotta,
    /// Light blue
    SkyBlue,
    /// Light green
    LightKellyGreen,
    /// Light purple
    Lavender,
}

impl TrackColor {
    /// All tags in assignment order
    pub const ALL: [TrackColor; 7] = [
        TrackColor::LightOrange,
        TrackColor::Periwinkle,
        TrackColor::LightYellow,
        TrackColor::SoftTerracotta,
        TrackColor::SkyBlue,
        TrackColor::LightKellyGreen,
        TrackColor::Lavender,
    ];

    /// Tag for an assignment counter, wrapping around
    pub fn for_index(index: usize) -> Self {
        Self::ALL[index % Self::ALL.len()]
    }

    /// RGB components in `0.0..=1.0`
    pub fn rgb(self) -> (f32, f32, f32) {
        match self {
            TrackColor::LightOrange => (1.0, 0.8, 0.5),
            TrackColor::Periwinkle => (0.6, 0.6, 0.9),
            TrackColor::LightYellow => (1.0, 0.96, 0.65),
            TrackColor::SoftTerracotta => (0.88, 0.52, 0.43),
            TrackColor::SkyBlue => (0.53, 0.81, 0.92),
            TrackColor::LightKellyGreen => (0.56, 0.87, 0.56),
            TrackColor::Lavender => (0.78, 0.64, 0.87),
        }
    }
}

/// Imported audio track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    /// Unique track identifier
    pub id: TrackId,

    /// Original file name
    pub file_name: String,

    /// Display title
    pub title: String,

    /// Duration in seconds (0 when unknown)
    #[serde(default)]
    pub duration_secs: f64,

    /// When the track was added to the library
    pub imported_at: DateTime<Utc>,

    /// Color tag
    #[serde(default)]
    pub color: TrackColor,

    /// Audio file location relative to the library root
    pub relative_path: String,
}

impl Track {
    /// Create a new track with minimal metadata
    pub fn new(
        title: impl Into<String>,
        file_name: impl Into<String>,
        relative_path: impl Into<String>,
    ) -> Self {
        Self {
            id: TrackId::generate(),
            file_name: file_name.into(),
            title: title.into(),
            duration_secs: 0.0,
            imported_at: Utc::now(),
            color: TrackColor::default(),
            relative_path: relative_path.into(),
        }
    }

    /// Set the duration
    #[must_use]
    pub fn with_duration(mut self, duration_secs: f64) -> Self {
        self.duration_secs = if duration_secs.is_finite() {
            duration_secs.max(0.0)
        } else {
            0.0
        };
        self
    }

    /// Set the color tag
    #[must_use]
    pub fn with_color(mut self, color: TrackColor) -> Self {
        self.color = color;
        self
    }
}
