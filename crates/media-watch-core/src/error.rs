use media_watch_sources::SourceError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize lists: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Why a playback request did not produce a playing stream.
///
/// `EndOfSeries` is a normal terminal condition, kept apart from the
/// failure variants so callers can show it as a notice rather than an error.
#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("end of series: no episode follows episode {number}")]
    EndOfSeries { number: u32 },

    #[error("no episode is currently loaded")]
    NoEpisode,

    #[error("no stream is loaded")]
    NotLoaded,

    #[error("provider failed to resolve a stream: {0}")]
    Upstream(#[from] SourceError),

    #[error("provider returned no stream for {0}")]
    StreamUnavailable(String),

    #[error("fatal stream error: {0}")]
    StreamFatal(String),

    #[error("stale load request {ticket} superseded by {current}")]
    Stale { ticket: u64, current: u64 },

    #[error(transparent)]
    Store(#[from] StoreError),
}
