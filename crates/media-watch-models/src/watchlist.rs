use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::media::{MediaKind, MediaRef};
use crate::runtime::convert_duration_to_seconds;

/// A work stored in one of the persisted lists.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistItem {
    #[serde(flatten)]
    pub media: MediaRef,
    /// Total running time in seconds; `null` when the duration string was unparseable
    #[serde(default)]
    pub finish_timestamp: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub times_watched: Option<u32>,
    /// Last time progress was recorded (absent in data written by older clients)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_watched_at: Option<DateTime<Utc>>,
}

impl WatchlistItem {
    /// Entry created the first time a work is opened for playback.
    ///
    /// Carries the full episode list so per-episode progress has slots to update.
    pub fn for_playback(media: MediaRef) -> Self {
        let finish_timestamp = convert_duration_to_seconds(&media.duration).as_seconds();
        Self {
            media,
            finish_timestamp,
            completed: Some(false),
            times_watched: Some(0),
            last_watched_at: None,
        }
    }

    /// Entry created by an explicit "add to watchlist".
    pub fn saved(media: MediaRef) -> Self {
        let finish_timestamp = convert_duration_to_seconds(&media.duration).as_seconds();
        Self {
            media,
            finish_timestamp,
            completed: None,
            times_watched: None,
            last_watched_at: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.media.id
    }

    pub fn is_completed(&self) -> bool {
        self.completed.unwrap_or(false)
    }

    pub fn times_watched(&self) -> u32 {
        self.times_watched.unwrap_or(0)
    }

    /// Stored Movie position; `None` for episodic works
    pub fn movie_timestamp(&self) -> Option<f64> {
        match self.media.kind {
            MediaKind::Movie { timestamp } => timestamp,
            _ => None,
        }
    }

    /// Fraction watched for movies, or completed episodes over total for series
    pub fn progress(&self) -> Option<f64> {
        match &self.media.kind {
            MediaKind::Movie { timestamp } => {
                let finish = self.finish_timestamp.filter(|f| *f > 0.0)?;
                Some((timestamp.unwrap_or(0.0) / finish).clamp(0.0, 1.0))
            }
            kind => {
                let episodes = kind.episodes();
                if episodes.is_empty() {
                    return None;
                }
                let done = episodes
                    .iter()
                    .filter(|e| e.episode.completed.unwrap_or(false))
                    .count();
                Some(done as f64 / episodes.len() as f64)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::Rating;

    fn movie(duration: &str) -> MediaRef {
        MediaRef {
            id: "movie/watch-heat-19690".to_string(),
            title: "Heat".to_string(),
            thumbnail: String::new(),
            cover: String::new(),
            description: String::new(),
            genres: vec!["Crime".to_string()],
            actors: Vec::new(),
            country: Vec::new(),
            rating: Rating::Score(8.3),
            production: String::new(),
            release_date: "1995-12-15".to_string(),
            duration: duration.to_string(),
            kind: MediaKind::Movie { timestamp: None },
        }
    }

    #[test]
    fn test_for_playback_defaults() {
        let item = WatchlistItem::for_playback(movie("170 min"));
        assert_eq!(item.finish_timestamp, Some(10200.0));
        assert_eq!(item.completed, Some(false));
        assert_eq!(item.times_watched, Some(0));
    }

    #[test]
    fn test_unparseable_duration_serializes_null_finish() {
        let item = WatchlistItem::for_playback(movie("N/A"));
        let value = serde_json::to_value(&item).unwrap();
        assert!(value["finishTimestamp"].is_null());
        assert_eq!(value["type"], "Movie");
        assert_eq!(value["timesWatched"], 0);
    }

    #[test]
    fn test_reads_legacy_entry() {
        let json = r#"{
            "id": "m1", "title": "Heat", "type": "Movie", "thumbnail": "t.jpg",
            "cover": "", "description": "", "genres": [], "actors": [], "country": [],
            "rating": 8.3, "production": "", "releaseDate": "", "duration": "170 min",
            "timestamp": 42.5, "finishTimestamp": 10200, "completed": false
        }"#;
        let item: WatchlistItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.id(), "m1");
        assert_eq!(item.movie_timestamp(), Some(42.5));
        assert_eq!(item.finish_timestamp, Some(10200.0));
        assert_eq!(item.times_watched(), 0);
        assert!(!item.is_completed());
    }

    #[test]
    fn test_movie_progress() {
        let mut item = WatchlistItem::for_playback(movie("100 min"));
        item.media.kind = MediaKind::Movie { timestamp: Some(3000.0) };
        assert_eq!(item.progress(), Some(0.5));
    }
}
