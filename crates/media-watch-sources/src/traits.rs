use async_trait::async_trait;
use media_watch_models::MediaRef;
use crate::error::SourceError;

/// Metadata and stream resolution for a catalog.
///
/// The capability is the same for every media kind. Whether a caller asks for
/// Anime subtitles is its own decision (see `subtitles.fetch_for_anime`).
#[async_trait]
pub trait ContentProvider: Send + Sync {
    fn provider_name(&self) -> &str;

    async fn search(&self, query: &str) -> Result<Vec<MediaRef>, SourceError>;

    /// Full metadata for one work, episodes included for Show and Anime
    async fn get_media_info(&self, id: &str) -> Result<MediaRef, SourceError>;

    /// Stream URL for a movie (its own id) or an episode (episode id plus the
    /// parent work's id). `None` when the provider has no stream for it.
    async fn get_stream_url(&self, id: &str, parent_id: Option<&str>) -> Result<Option<String>, SourceError>;

    async fn get_subtitle_url(&self, id: &str, parent_id: Option<&str>) -> Result<Option<String>, SourceError>;
}
