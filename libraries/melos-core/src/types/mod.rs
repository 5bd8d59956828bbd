mod ids;
mod queue;
mod settings;
mod track;

pub use ids::{EntryId, LoadId, TrackId};
pub use queue::QueueEntry;
pub use settings::AppSettings;
pub use track::{Track, TrackColor};
