use anyhow::Result;
use std::path::{Path, PathBuf};

/// Base directory override from the `STREAMFLIX_HOME` environment variable
pub fn home_override() -> Option<PathBuf> {
    std::env::var("STREAMFLIX_HOME").ok().map(PathBuf::from)
}

pub struct PathManager {
    config_dir: PathBuf,
    data_dir: PathBuf,
    log_dir: PathBuf,
}

impl PathManager {
    pub fn new() -> Result<Self> {
        if let Some(base) = home_override() {
            return Ok(Self::from_base(base));
        }

        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
            .join("streamflix");
        let data_dir = dirs::data_dir()
            .map(|d| d.join("streamflix"))
            .unwrap_or_else(|| config_dir.join("data"));

        Ok(Self {
            log_dir: data_dir.join("logs"),
            config_dir,
            data_dir,
        })
    }

    /// Everything under one directory: config at the top, data/logs in subdirs
    pub fn from_base(base: PathBuf) -> Self {
        Self {
            config_dir: base.clone(),
            data_dir: base.join("data"),
            log_dir: base.join("logs"),
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    /// JSON document holding the watchlist, watching and completed lists
    pub fn lists_file(&self) -> PathBuf {
        self.data_dir.join("lists.json")
    }

    pub fn log_file(&self) -> PathBuf {
        self.log_dir.join("streamflix.log")
    }

    pub fn ensure_directories(&self) -> Result<()> {
        std::fs::create_dir_all(&self.config_dir)?;
        std::fs::create_dir_all(&self.data_dir)?;
        std::fs::create_dir_all(&self.log_dir)?;
        Ok(())
    }
}

impl Default for PathManager {
    fn default() -> Self {
        Self::new().unwrap_or_else(|_| Self::from_base(PathBuf::from(".streamflix")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_base_layout() {
        let paths = PathManager::from_base(PathBuf::from("/srv/streamflix"));
        assert_eq!(paths.config_file(), PathBuf::from("/srv/streamflix/config.toml"));
        assert_eq!(paths.lists_file(), PathBuf::from("/srv/streamflix/data/lists.json"));
        assert_eq!(paths.log_file(), PathBuf::from("/srv/streamflix/logs/streamflix.log"));
    }

    #[test]
    fn test_ensure_directories() {
        let dir = tempfile::tempdir().unwrap();
        let paths = PathManager::from_base(dir.path().join("home"));
        paths.ensure_directories().unwrap();
        assert!(paths.data_dir().is_dir());
        assert!(paths.log_dir().is_dir());
    }
}
