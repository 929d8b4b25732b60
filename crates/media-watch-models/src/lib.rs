pub mod list;
pub mod media;
pub mod runtime;
pub mod watchlist;

pub use list::ListName;
pub use media::{Episode, EpisodeRef, MediaKind, MediaRef, Rating, SeasonEpisode};
pub use runtime::{convert_duration_to_seconds, convert_minutes_to_hours, format_clock, Runtime};
pub use watchlist::WatchlistItem;
