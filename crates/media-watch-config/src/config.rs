use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub subtitles: SubtitleConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Default, Serialize, Deserialize, Clone)]
pub struct StorageConfig {
    /// Override for the lists document (defaults to `<data_dir>/lists.json`)
    #[serde(default)]
    pub lists_file: Option<PathBuf>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SubtitleConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// The desktop client never fetched separate caption tracks for anime
    #[serde(default)]
    pub fetch_for_anime: bool,
    #[serde(default = "default_true")]
    pub strip_markup: bool,
}

impl Default for SubtitleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            fetch_for_anime: false,
            strip_markup: true,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub catalog: Option<CatalogConfig>,
}

/// Offline catalog file used as a content provider
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CatalogConfig {
    pub enabled: bool,
    pub path: PathBuf,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: Option<bool>,
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: None,
            file: None,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

const VALID_LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

impl Config {
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load the file if it exists, otherwise fall back to defaults
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save_to_file(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !VALID_LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(anyhow::anyhow!("Invalid logging level: {}", self.logging.level));
        }

        if let Some(catalog) = &self.providers.catalog {
            if catalog.enabled && catalog.path.as_os_str().is_empty() {
                return Err(anyhow::anyhow!("Catalog provider is enabled but no path is configured"));
            }
        }

        if let Some(lists_file) = &self.storage.lists_file {
            if lists_file.as_os_str().is_empty() {
                return Err(anyhow::anyhow!("storage.lists_file cannot be empty"));
            }
        }

        Ok(())
    }

    /// Lists document location, honoring the storage override
    pub fn lists_file(&self, paths: &crate::PathManager) -> PathBuf {
        self.storage
            .lists_file
            .clone()
            .unwrap_or_else(|| paths.lists_file())
    }

    /// Get list of configured and enabled providers
    pub fn get_configured_providers(&self) -> Vec<String> {
        let mut providers = Vec::new();

        if let Some(catalog) = &self.providers.catalog {
            if catalog.enabled && !catalog.path.as_os_str().is_empty() {
                providers.push("catalog".to_string());
            }
        }

        providers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_config_load_and_save() {
        let file = NamedTempFile::new().unwrap();
        let config = Config {
            storage: StorageConfig {
                lists_file: Some(PathBuf::from("/tmp/lists.json")),
            },
            subtitles: SubtitleConfig {
                fetch_for_anime: true,
                ..SubtitleConfig::default()
            },
            providers: ProvidersConfig {
                catalog: Some(CatalogConfig {
                    enabled: true,
                    path: PathBuf::from("catalog.json"),
                }),
            },
            logging: LoggingConfig::default(),
        };

        let path = file.path().to_path_buf();
        config.save_to_file(&path).unwrap();

        let loaded = Config::load_from_file(&path).unwrap();
        assert_eq!(loaded.storage.lists_file, Some(PathBuf::from("/tmp/lists.json")));
        assert!(loaded.subtitles.fetch_for_anime);
        assert!(loaded.subtitles.enabled);
        assert_eq!(loaded.get_configured_providers(), vec!["catalog".to_string()]);
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.subtitles.enabled);
        assert!(!config.subtitles.fetch_for_anime);
        assert!(config.subtitles.strip_markup);
        assert_eq!(config.logging.level, "info");
        assert!(config.get_configured_providers().is_empty());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(&dir.path().join("missing.toml")).unwrap();
        assert!(config.providers.catalog.is_none());
    }

    #[test]
    fn test_config_validate() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());

        config.logging.level = "debug".to_string();
        config.providers.catalog = Some(CatalogConfig {
            enabled: true,
            path: PathBuf::new(),
        });
        assert!(config.validate().is_err());
    }
}
