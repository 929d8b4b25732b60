use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The three persisted collections a title can live in.
///
/// The serialized names double as the storage keys, so they must never change:
/// existing stores written by older clients use exactly these strings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ListName {
    /// Explicitly saved for later ("add to watchlist")
    #[serde(rename = "watchlist")]
    Watchlist,
    /// Opened for playback and not yet finished ("continue watching")
    #[serde(rename = "watchinglist")]
    WatchingList,
    /// Finished at least once
    #[serde(rename = "completedlist")]
    CompletedList,
}

impl ListName {
    pub const ALL: [ListName; 3] = [
        ListName::Watchlist,
        ListName::WatchingList,
        ListName::CompletedList,
    ];

    /// Storage key for this list
    pub fn key(&self) -> &'static str {
        match self {
            ListName::Watchlist => "watchlist",
            ListName::WatchingList => "watchinglist",
            ListName::CompletedList => "completedlist",
        }
    }

    /// Human-facing label
    pub fn label(&self) -> &'static str {
        match self {
            ListName::Watchlist => "Watchlist",
            ListName::WatchingList => "Continue Watching",
            ListName::CompletedList => "Completed",
        }
    }
}

impl fmt::Display for ListName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ListName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "watchlist" => Ok(ListName::Watchlist),
            "watchinglist" | "watching" | "continue" => Ok(ListName::WatchingList),
            "completedlist" | "completed" => Ok(ListName::CompletedList),
            other => Err(format!(
                "Invalid list name: {}. Use 'watchlist', 'watching', or 'completed'",
                other
            )),
        }
    }
}
