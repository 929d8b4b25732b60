pub mod controls;
pub mod error;
pub mod playback;
pub mod store;
pub mod subtitles;
pub mod watch_state;

pub use controls::ControlsVisibility;
pub use error::{PlaybackError, StoreError};
pub use playback::{
    HlsTuning, LoadTicket, MediaSurface, PlaybackController, PlaybackState, PlayerEvent, SessionOutcome,
    StreamRequest, SKIP_SECONDS,
};
pub use store::{JsonFileListStore, ListStore, MemoryListStore};
pub use subtitles::{active_cue_at, parse_captions, strip_markup, Cue, CueTrack};
pub use watch_state::{EpisodeProgress, WatchStateEngine};
