//! Melos Core
//!
//! Platform-agnostic core types, traits, and error handling for Melos.
//!
//! This crate provides the foundational building blocks shared by the
//! storage layer, the playback engine and the applications.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Track`, `TrackColor`, `QueueEntry`, `AppSettings`
//! - **Collaborator Traits**: `TrackCatalog`, `MediaDecoder`, `KeyValueStore`
//! - **Error Handling**: Unified `MelosError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use melos_core::types::{QueueEntry, Track, TrackId};
//!
//! // Register a track
//! let track = Track::new("Morning", "morning.mp3", "Music/morning.mp3");
//!
//! // Queue it twice; each slot gets its own identity
//! let first = QueueEntry::new(track.id.clone());
//! let second = QueueEntry::new(track.id.clone());
//! assert_ne!(first.id, second.id);
//! assert_eq!(first.track_id, second.track_id);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod storage;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::{MelosError, Result};
pub use storage::{keys, KeyValueStore, MemoryStore};
pub use traits::{MediaDecoder, TrackCatalog};

pub use types::{AppSettings, EntryId, LoadId, QueueEntry, Track, TrackColor, TrackId};
