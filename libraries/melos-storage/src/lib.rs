//! Melos Storage
//!
//! Durable state for Melos, kept as one JSON document per key.
//!
//! # Architecture
//!
//! - **Backend**: `FileStore` (one `<key>.json` per key, atomic replace),
//!   implementing `melos_core::KeyValueStore`; `MemoryStore` is re-exported
//!   from core for tests
//! - **Vertical slices**: `library` (track catalog) and `settings` each own
//!   their key and their serialization
//!
//! # Example
//!
//! ```rust,no_run
//! use melos_storage::{FileStore, Library};
//! use std::sync::Arc;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(FileStore::new("./data"));
//! let library = Library::open(store, "./data");
//!
//! let track = library.import("Morning", "morning.mp3", "Music/morning.mp3", 184.0)?;
//! assert!(library.get(&track.id).is_some());
//! # Ok(())
//! # }
//! ```

mod error;
mod file_store;
mod probe;

// Vertical slices
pub mod library;
pub mod settings;

pub use error::{Result, StorageError};
pub use file_store::FileStore;
pub use library::Library;
pub use melos_core::MemoryStore;
pub use probe::{probe_file, ProbedFile};
