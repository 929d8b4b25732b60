use crate::error::StoreError;
use media_watch_config::{Config, PathManager};
use media_watch_models::{ListName, WatchlistItem};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Key-value backed storage of the three persisted lists.
///
/// A missing key reads as an empty list. Every write replaces whole lists and
/// is all-or-nothing from the caller's perspective, including multi-list
/// writes through [`ListStore::set_many`].
pub trait ListStore {
    fn get(&self, list: ListName) -> Result<Vec<WatchlistItem>, StoreError>;

    /// Commit several lists in a single write
    fn set_many(&mut self, writes: &[(ListName, &[WatchlistItem])]) -> Result<(), StoreError>;

    fn set(&mut self, list: ListName, items: &[WatchlistItem]) -> Result<(), StoreError> {
        self.set_many(&[(list, items)])
    }
}

/// In-process store keeping each list as its serialized JSON text, the same
/// way browser local storage would.
#[derive(Debug, Default, Clone)]
pub struct MemoryListStore {
    values: HashMap<String, String>,
}

impl MemoryListStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw stored text for a list, if the key was ever written
    pub fn raw(&self, list: ListName) -> Option<&str> {
        self.values.get(list.key()).map(|s| s.as_str())
    }
}

impl ListStore for MemoryListStore {
    fn get(&self, list: ListName) -> Result<Vec<WatchlistItem>, StoreError> {
        match self.values.get(list.key()) {
            Some(raw) => Ok(serde_json::from_str(raw)?),
            None => Ok(Vec::new()),
        }
    }

    fn set_many(&mut self, writes: &[(ListName, &[WatchlistItem])]) -> Result<(), StoreError> {
        // Serialize everything before touching the map so a failure leaves no partial write
        let mut encoded = Vec::with_capacity(writes.len());
        for (list, items) in writes {
            encoded.push((list.key().to_string(), serde_json::to_string(items)?));
        }
        self.values.extend(encoded);
        Ok(())
    }
}

/// Lists persisted as one JSON document on disk.
///
/// The document is an object keyed by list name; keys this crate does not
/// know about are carried through untouched. Writes go to a temp file that is
/// renamed over the original, so a crash never leaves a half-written document.
pub struct JsonFileListStore {
    path: PathBuf,
    document: Map<String, Value>,
}

impl JsonFileListStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let document = Self::load_document(&path)?;
        Ok(Self { path, document })
    }

    /// Open the lists file configured for this installation
    pub fn from_config(config: &Config, paths: &PathManager) -> Result<Self, StoreError> {
        Self::open(config.lists_file(paths))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_document(path: &Path) -> Result<Map<String, Value>, StoreError> {
        if !path.exists() {
            debug!("Lists file {:?} does not exist, starting empty", path);
            return Ok(Map::new());
        }

        let content = std::fs::read_to_string(path)?;
        let mut document = match serde_json::from_str::<Map<String, Value>>(&content) {
            Ok(document) => document,
            Err(e) => {
                warn!("Lists file {:?} is not a JSON object ({}). Starting empty.", path, e);
                Self::backup(path);
                return Ok(Map::new());
            }
        };

        let mut corrupted = Vec::new();
        for list in ListName::ALL {
            if let Some(value) = document.get(list.key()) {
                if let Err(e) = serde_json::from_value::<Vec<WatchlistItem>>(value.clone()) {
                    warn!("Stored {} has an unexpected shape ({}). Dropping it.", list, e);
                    corrupted.push(list);
                }
            }
        }
        if !corrupted.is_empty() {
            Self::backup(path);
            for list in corrupted {
                document.remove(list.key());
            }
        }

        info!("Loaded lists from {:?}", path);
        Ok(document)
    }

    fn backup(path: &Path) {
        let backup_path = path.with_extension("json.bak");
        match std::fs::copy(path, &backup_path) {
            Ok(_) => info!("Backed up unreadable lists file to {:?}", backup_path),
            Err(e) => warn!("Failed to back up unreadable lists file: {}", e),
        }
    }
}

impl ListStore for JsonFileListStore {
    fn get(&self, list: ListName) -> Result<Vec<WatchlistItem>, StoreError> {
        match self.document.get(list.key()) {
            Some(value) => Ok(serde_json::from_value(value.clone())?),
            None => Ok(Vec::new()),
        }
    }

    fn set_many(&mut self, writes: &[(ListName, &[WatchlistItem])]) -> Result<(), StoreError> {
        let mut next = self.document.clone();
        for (list, items) in writes {
            next.insert(list.key().to_string(), serde_json::to_value(items)?);
        }

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&next)?;
        let temp_path = self.path.with_extension("json.tmp");
        std::fs::write(&temp_path, json)?;
        std::fs::rename(&temp_path, &self.path)?;

        debug!(
            lists = ?writes.iter().map(|(l, items)| (l.key(), items.len())).collect::<Vec<_>>(),
            "Lists saved"
        );
        self.document = next;
        Ok(())
    }
}
