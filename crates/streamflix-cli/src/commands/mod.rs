pub mod catalog;
pub mod clear;
pub mod config;
pub mod lists;
pub mod play;
pub mod subs;

use color_eyre::eyre::{eyre, Context as _};
use color_eyre::Result;
use media_watch_config::{Config, PathManager};
use media_watch_core::{JsonFileListStore, WatchStateEngine};
use media_watch_sources::{ContentProvider, ProviderRegistry};
use std::path::PathBuf;

/// Everything a command needs to reach storage and providers
pub struct Context {
    pub paths: PathManager,
    pub config: Config,
    pub config_path: PathBuf,
}

impl Context {
    pub fn engine(&self) -> Result<WatchStateEngine<JsonFileListStore>> {
        let store = JsonFileListStore::from_config(&self.config, &self.paths)
            .wrap_err("Failed to open the lists file")?;
        Ok(WatchStateEngine::new(store))
    }

    /// First enabled content provider
    pub async fn provider(&self) -> Result<Box<dyn ContentProvider>> {
        let registry = ProviderRegistry::new();
        registry
            .validate_all_configs(&self.config)
            .map_err(|e| eyre!("{}", e))?;
        registry
            .create_all_providers(&self.config)
            .await
            .map_err(|e| eyre!("{}", e))?
            .into_iter()
            .next()
            .ok_or_else(|| {
                eyre!(
                    "No content provider configured. Add a [providers.catalog] section to {}",
                    self.config_path.display()
                )
            })
    }
}
