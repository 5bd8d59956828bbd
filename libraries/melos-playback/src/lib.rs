//! Melos - Playback Management
//!
//! Queue and playback coordination for Melos.
//!
//! This crate provides:
//! - Persistent queue with a wrapping cursor (continuous loop)
//! - Follow-by-identity cursor across removals and reorders
//! - Playback session driving an external decoder
//! - Skipping of queued tracks deleted from the library
//! - Back button disambiguation (restart vs. previous track)
//! - Single-owner controller task with snapshot and event channels
//! - System media controls (remote commands, now-playing info)
//!
//! # Architecture
//!
//! `melos-playback` does not decode audio and does not know where tracks
//! are stored:
//! - Audio output is a `melos_core::MediaDecoder`
//! - Track lookup is a `melos_core::TrackCatalog`
//! - Persistence is a `melos_core::KeyValueStore`
//!
//! # Example: Queue
//!
//! ```rust
//! use melos_core::TrackId;
//! use melos_playback::QueueEngine;
//!
//! let mut queue = QueueEngine::in_memory();
//! queue.replace(["a", "b", "c"].map(TrackId::new), 2);
//!
//! // Advancing past the end loops back to the start
//! assert!(queue.advance());
//! assert_eq!(queue.current_index(), 0);
//!
//! // Removing another entry keeps the cursor on the same entry
//! queue.jump_to(2);
//! queue.remove(&[0]);
//! assert_eq!(queue.current_entry().unwrap().track_id.as_str(), "c");
//! ```
//!
//! # Example: Controller
//!
//! ```rust,no_run
//! use melos_core::{MediaDecoder, TrackCatalog};
//! use melos_playback::{
//!     DecoderEvents, PlaybackConfig, PlaybackSession, PlayerController, QueueEngine,
//! };
//! use std::sync::Arc;
//!
//! # async fn example(
//! #     decoder: Box<dyn MediaDecoder>,
//! #     catalog: Arc<dyn TrackCatalog>,
//! #     store: Arc<dyn melos_core::KeyValueStore>,
//! # ) -> melos_playback::Result<()> {
//! let config = PlaybackConfig::default();
//! let (_decoder_events, decoder_stream) = DecoderEvents::channel();
//!
//! let queue = QueueEngine::restore(store);
//! let session = PlaybackSession::new(decoder, catalog, config);
//! let (controller, handle) =
//!     PlayerController::new(queue, session, decoder_stream, config.progress_interval);
//! let task = controller.spawn();
//!
//! handle.play()?;
//! handle.shutdown()?;
//! task.await.ok();
//! # Ok(())
//! # }
//! ```

mod back_gesture;
pub mod controller;
mod error;
mod events;
mod queue;
pub mod remote;
mod session;
#[cfg(test)]
mod testing;
pub mod types;

// Public exports
pub use back_gesture::{BackGesture, BackTap, RestartToken};
pub use controller::{
    ControlCommand, ControlHandle, DecoderEvent, DecoderEventStream, DecoderEvents,
    PlayerController,
};
pub use error::{PlaybackError, Result};
pub use events::PlaybackEvent;
pub use queue::{QueueEngine, QueueStateRecord};
pub use remote::{CommandStatus, NowPlayingInfo, RemoteCommand, RemoteCommandCenter};
pub use session::PlaybackSession;
pub use types::{PlaybackConfig, PlaybackState, SessionSnapshot};
