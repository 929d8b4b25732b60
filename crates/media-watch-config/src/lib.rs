pub mod config;
pub mod paths;

pub use config::{CatalogConfig, Config, LoggingConfig, ProvidersConfig, StorageConfig, SubtitleConfig};
pub use paths::{PathManager, home_override};
