use serde::{Deserialize, Deserializer, Serialize};
use crate::runtime::convert_duration_to_seconds;
use std::fmt;

/// A playable work as returned by a content provider.
///
/// The JSON shape is the flat camelCase object the desktop client has always
/// stored, with the `type` tag selecting the [`MediaKind`] variant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MediaRef {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub thumbnail: String,
    #[serde(default)]
    pub cover: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub actors: Vec<String>,
    #[serde(default)]
    pub country: Vec<String>,
    #[serde(default)]
    pub rating: Rating,
    #[serde(default)]
    pub production: String,
    #[serde(default)]
    pub release_date: String,
    /// Free-form runtime such as "142 min"; see [`crate::convert_duration_to_seconds`]
    #[serde(default)]
    pub duration: String,
    #[serde(flatten)]
    pub kind: MediaKind,
}

/// Type-specific part of a work.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum MediaKind {
    Movie {
        /// Seconds into the movie, only meaningful on stored list entries
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timestamp: Option<f64>,
    },
    Show {
        #[serde(default)]
        episodes: Vec<SeasonEpisode>,
    },
    Anime {
        #[serde(default)]
        episodes: Vec<Episode>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Episode {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    /// 1-based; unique within a season for shows, sequential for anime
    pub number: u32,
    #[serde(default)]
    pub thumbnail: String,
    #[serde(default)]
    pub description: String,
    /// Falls back to the parent's duration when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

/// A show episode; anime episodes carry no season.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SeasonEpisode {
    pub season: u32,
    #[serde(flatten)]
    pub episode: Episode,
}

/// Borrowed view of an episode together with its season, if any.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpisodeRef<'a> {
    pub season: Option<u32>,
    pub episode: &'a Episode,
}

/// Either a numeric score or a provider label (usually "N/A").
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Rating {
    Score(f64),
    Unrated(String),
}

impl Default for Rating {
    fn default() -> Self {
        Rating::Unrated("N/A".to_string())
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rating::Score(score) if score.is_finite() => write!(f, "{}", score),
            Rating::Score(_) => f.write_str("N/A"),
            Rating::Unrated(label) => f.write_str(label),
        }
    }
}

impl MediaKind {
    /// The `type` tag as stored
    pub fn type_name(&self) -> &'static str {
        match self {
            MediaKind::Movie { .. } => "Movie",
            MediaKind::Show { .. } => "Show",
            MediaKind::Anime { .. } => "Anime",
        }
    }

    pub fn is_movie(&self) -> bool {
        matches!(self, MediaKind::Movie { .. })
    }

    pub fn is_anime(&self) -> bool {
        matches!(self, MediaKind::Anime { .. })
    }

    /// All episodes in document order (empty for movies)
    pub fn episodes(&self) -> Vec<EpisodeRef<'_>> {
        match self {
            MediaKind::Movie { .. } => Vec::new(),
            MediaKind::Show { episodes } => episodes
                .iter()
                .map(|e| EpisodeRef { season: Some(e.season), episode: &e.episode })
                .collect(),
            MediaKind::Anime { episodes } => episodes
                .iter()
                .map(|episode| EpisodeRef { season: None, episode })
                .collect(),
        }
    }

    pub fn find_episode(&self, episode_id: &str) -> Option<EpisodeRef<'_>> {
        self.episodes()
            .into_iter()
            .find(|e| e.episode.id == episode_id)
    }

    pub fn episode_mut(&mut self, episode_id: &str) -> Option<&mut Episode> {
        match self {
            MediaKind::Movie { .. } => None,
            MediaKind::Show { episodes } => episodes
                .iter_mut()
                .map(|e| &mut e.episode)
                .find(|e| e.id == episode_id),
            MediaKind::Anime { episodes } => episodes.iter_mut().find(|e| e.id == episode_id),
        }
    }

    /// The episode that follows `current`.
    ///
    /// Anime is a flat sequence: the first episode numbered `number + 1`.
    /// Shows look for `number + 1` in the same season first, then fall back to
    /// the lowest-numbered episode of the next season.
    pub fn next_episode(&self, current: &EpisodeRef<'_>) -> Option<EpisodeRef<'_>> {
        let next_number = current.episode.number + 1;
        let episodes = self.episodes();

        if let Some(next) = episodes
            .iter()
            .find(|e| e.season == current.season && e.episode.number == next_number)
        {
            return Some(*next);
        }

        let season = current.season?;
        episodes
            .into_iter()
            .filter(|e| e.season == Some(season + 1))
            .min_by_key(|e| e.episode.number)
    }
}

impl MediaRef {
    /// Finish time of an episode in seconds: its own duration, else the work's
    pub fn episode_finish(&self, episode: &Episode) -> Option<f64> {
        let duration = episode.duration.as_deref().unwrap_or(&self.duration);
        convert_duration_to_seconds(duration).as_seconds()
    }

    /// Display title, including the season/episode suffix when given
    pub fn display_title(&self, episode: Option<&EpisodeRef<'_>>) -> String {
        match episode {
            Some(EpisodeRef { season: Some(season), episode }) => {
                format!("{} - Season {} Episode {}", self.title, season, episode.number)
            }
            Some(EpisodeRef { season: None, episode }) => {
                format!("{} - Episode {}", self.title, episode.number)
            }
            None => self.title.clone(),
        }
    }
}

/// Provider ids are sometimes numeric (AniList); store them as strings.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Unsigned(u64),
        Signed(i64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Unsigned(n) => n.to_string(),
        Id::Signed(n) => n.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn episode(id: &str, number: u32) -> Episode {
        Episode {
            id: id.to_string(),
            title: format!("Episode {}", number),
            number,
            thumbnail: String::new(),
            description: String::new(),
            duration: None,
            timestamp: None,
            completed: None,
        }
    }

    fn show() -> MediaKind {
        MediaKind::Show {
            episodes: vec![
                SeasonEpisode { season: 1, episode: episode("s1e1", 1) },
                SeasonEpisode { season: 1, episode: episode("s1e2", 2) },
                SeasonEpisode { season: 2, episode: episode("s2e2", 2) },
                SeasonEpisode { season: 2, episode: episode("s2e1", 1) },
            ],
        }
    }

    #[test]
    fn test_show_json_shape() {
        let json = r#"{
            "id": "tv/watch-severance-1234",
            "title": "Severance",
            "type": "Show",
            "rating": 8.7,
            "duration": "55 min",
            "releaseDate": "2022-02-18",
            "episodes": [
                {"id": "e1", "title": "Good News About Hell", "number": 1, "season": 1}
            ]
        }"#;
        let media: MediaRef = serde_json::from_str(json).unwrap();
        assert_eq!(media.kind.type_name(), "Show");
        assert_eq!(media.release_date, "2022-02-18");
        assert_eq!(media.rating, Rating::Score(8.7));
        let ep = media.kind.find_episode("e1").unwrap();
        assert_eq!(ep.season, Some(1));

        let value = serde_json::to_value(&media).unwrap();
        assert_eq!(value["type"], "Show");
        assert_eq!(value["episodes"][0]["season"], 1);
        assert_eq!(value["episodes"][0]["number"], 1);
    }

    #[test]
    fn test_numeric_id_and_unrated() {
        let json = r#"{"id": 21, "title": "One Piece", "type": "Anime", "rating": "N/A"}"#;
        let media: MediaRef = serde_json::from_str(json).unwrap();
        assert_eq!(media.id, "21");
        assert_eq!(media.rating.to_string(), "N/A");
        assert!(media.kind.is_anime());
        assert!(media.kind.episodes().is_empty());
    }

    #[test]
    fn test_movie_ignores_episode_fields() {
        let json = r#"{"id": "m1", "title": "Heat", "type": "Movie", "episodes": []}"#;
        let media: MediaRef = serde_json::from_str(json).unwrap();
        assert_eq!(media.kind, MediaKind::Movie { timestamp: None });
    }

    #[test]
    fn test_next_episode_same_season() {
        let kind = show();
        let current = kind.find_episode("s1e1").unwrap();
        let next = kind.next_episode(&current).unwrap();
        assert_eq!(next.episode.id, "s1e2");
    }

    #[test]
    fn test_next_episode_rolls_into_next_season() {
        let kind = show();
        let current = kind.find_episode("s1e2").unwrap();
        let next = kind.next_episode(&current).unwrap();
        assert_eq!(next.episode.id, "s2e1");
    }

    #[test]
    fn test_next_episode_end_of_series() {
        let kind = show();
        let current = kind.find_episode("s2e2").unwrap();
        assert!(kind.next_episode(&current).is_none());
    }

    #[test]
    fn test_anime_next_episode_is_sequential() {
        let kind = MediaKind::Anime {
            episodes: vec![episode("a1", 1), episode("a2", 2)],
        };
        let current = kind.find_episode("a1").unwrap();
        assert_eq!(kind.next_episode(&current).unwrap().episode.id, "a2");
        let last = kind.find_episode("a2").unwrap();
        assert!(kind.next_episode(&last).is_none());
    }

    #[test]
    fn test_episode_finish_falls_back_to_parent_duration() {
        let json = r#"{"id": "a", "title": "Frieren", "type": "Anime", "duration": "24 min"}"#;
        let media: MediaRef = serde_json::from_str(json).unwrap();
        let mut ep = episode("a1", 1);
        assert_eq!(media.episode_finish(&ep), Some(1440.0));
        ep.duration = Some("30 min".to_string());
        assert_eq!(media.episode_finish(&ep), Some(1800.0));
        ep.duration = Some("unknown".to_string());
        assert_eq!(media.episode_finish(&ep), None);
    }
}
