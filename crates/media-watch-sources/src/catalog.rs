use async_trait::async_trait;
use media_watch_models::MediaRef;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::SourceError;
use crate::traits::ContentProvider;

/// Offline catalog document.
///
/// Stream and subtitle maps are keyed by movie id or episode id. An episode
/// entry may also be keyed as `<parent id>/<episode id>` when episode ids are
/// only unique within their work.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub media: Vec<MediaRef>,
    #[serde(default)]
    pub streams: HashMap<String, String>,
    #[serde(default)]
    pub subtitles: HashMap<String, String>,
}

impl Catalog {
    fn lookup<'a>(map: &'a HashMap<String, String>, id: &str, parent_id: Option<&str>) -> Option<&'a String> {
        parent_id
            .and_then(|parent| map.get(&format!("{}/{}", parent, id)))
            .or_else(|| map.get(id))
    }
}

/// Content provider backed by a JSON catalog file
pub struct CatalogProvider {
    path: Option<PathBuf>,
    catalog: Catalog,
}

impl CatalogProvider {
    pub fn new(catalog: Catalog) -> Self {
        Self { path: None, catalog }
    }

    pub async fn load(path: &Path) -> Result<Self, SourceError> {
        let content = tokio::fs::read_to_string(path).await?;
        let catalog: Catalog = serde_json::from_str(&content)?;
        info!(
            "Loaded catalog from {:?}: {} titles, {} streams",
            path,
            catalog.media.len(),
            catalog.streams.len()
        );
        Ok(Self {
            path: Some(path.to_path_buf()),
            catalog,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }
}

#[async_trait]
impl ContentProvider for CatalogProvider {
    fn provider_name(&self) -> &str {
        "catalog"
    }

    async fn search(&self, query: &str) -> Result<Vec<MediaRef>, SourceError> {
        let needle = query.trim().to_lowercase();
        let results: Vec<MediaRef> = self
            .catalog
            .media
            .iter()
            .filter(|m| needle.is_empty() || m.title.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        debug!(query, results = results.len(), "Catalog search");
        Ok(results)
    }

    async fn get_media_info(&self, id: &str) -> Result<MediaRef, SourceError> {
        self.catalog
            .media
            .iter()
            .find(|m| m.id == id)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(format!("media {}", id)))
    }

    async fn get_stream_url(&self, id: &str, parent_id: Option<&str>) -> Result<Option<String>, SourceError> {
        Ok(Catalog::lookup(&self.catalog.streams, id, parent_id).cloned())
    }

    async fn get_subtitle_url(&self, id: &str, parent_id: Option<&str>) -> Result<Option<String>, SourceError> {
        Ok(Catalog::lookup(&self.catalog.subtitles, id, parent_id).cloned())
    }
}
