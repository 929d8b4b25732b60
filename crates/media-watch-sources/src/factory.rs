//! Provider factory pattern for building content providers from configuration

use anyhow::Result;
use async_trait::async_trait;
use media_watch_config::Config;
use std::collections::HashMap;

use crate::ContentProvider;

/// Factory trait for creating content providers from configuration
#[async_trait]
pub trait ProviderFactory: Send + Sync {
    fn provider_name(&self) -> &str;

    /// Create a provider instance from configuration.
    /// Returns None if the provider is not enabled or not configured
    async fn create_provider(&self, config: &Config) -> Result<Option<Box<dyn ContentProvider>>>;

    fn validate_config(&self, config: &Config) -> Result<()>;
}

/// Registry of provider factories
pub struct ProviderRegistry {
    factories: HashMap<String, Box<dyn ProviderFactory>>,
}

impl ProviderRegistry {
    /// Create a new registry with all built-in factories registered
    pub fn new() -> Self {
        let mut registry = Self {
            factories: HashMap::new(),
        };
        registry.register(Box::new(catalog::CatalogProviderFactory));
        registry
    }

    pub fn register(&mut self, factory: Box<dyn ProviderFactory>) {
        self.factories.insert(factory.provider_name().to_string(), factory);
    }

    /// Create all enabled providers from configuration
    pub async fn create_all_providers(&self, config: &Config) -> Result<Vec<Box<dyn ContentProvider>>> {
        let mut providers = Vec::new();
        for factory in self.factories.values() {
            if let Some(provider) = factory.create_provider(config).await? {
                providers.push(provider);
            }
        }
        Ok(providers)
    }

    pub async fn create_provider_by_name(
        &self,
        name: &str,
        config: &Config,
    ) -> Result<Option<Box<dyn ContentProvider>>> {
        match self.factories.get(name) {
            Some(factory) => factory.create_provider(config).await,
            None => Ok(None),
        }
    }

    pub fn validate_all_configs(&self, config: &Config) -> Result<()> {
        for factory in self.factories.values() {
            factory.validate_config(config)?;
        }
        Ok(())
    }

    pub fn registered_providers(&self) -> Vec<&str> {
        self.factories.keys().map(|s| s.as_str()).collect()
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

mod catalog {
    use super::*;
    use crate::CatalogProvider;

    pub struct CatalogProviderFactory;

    #[async_trait]
    impl ProviderFactory for CatalogProviderFactory {
        fn provider_name(&self) -> &str {
            "catalog"
        }

        async fn create_provider(&self, config: &Config) -> Result<Option<Box<dyn ContentProvider>>> {
            match &config.providers.catalog {
                Some(catalog) if catalog.enabled => {
                    let provider = CatalogProvider::load(&catalog.path).await.map_err(|e| {
                        anyhow::anyhow!("Failed to load catalog {:?}: {}", catalog.path, e)
                    })?;
                    Ok(Some(Box::new(provider)))
                }
                _ => Ok(None),
            }
        }

        fn validate_config(&self, config: &Config) -> Result<()> {
            if let Some(catalog) = &config.providers.catalog {
                if catalog.enabled && !catalog.path.exists() {
                    return Err(anyhow::anyhow!(
                        "Catalog provider is enabled but {:?} does not exist",
                        catalog.path
                    ));
                }
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use media_watch_config::CatalogConfig;

    #[tokio::test]
    async fn test_disabled_catalog_creates_nothing() {
        let registry = ProviderRegistry::new();
        assert!(registry.is_registered("catalog"));

        let config = Config::default();
        assert!(registry.create_all_providers(&config).await.unwrap().is_empty());
        assert!(registry.create_provider_by_name("nope", &config).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_enabled_catalog_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, r#"{"media": []}"#).unwrap();

        let mut config = Config::default();
        config.providers.catalog = Some(CatalogConfig { enabled: true, path });

        let registry = ProviderRegistry::new();
        registry.validate_all_configs(&config).unwrap();
        let providers = registry.create_all_providers(&config).await.unwrap();
        assert_eq!(providers.len(), 1);
        assert_eq!(providers[0].provider_name(), "catalog");
    }

    #[test]
    fn test_validate_missing_catalog_file() {
        let mut config = Config::default();
        config.providers.catalog = Some(CatalogConfig {
            enabled: true,
            path: "/no/such/catalog.json".into(),
        });
        assert!(ProviderRegistry::new().validate_all_configs(&config).is_err());
    }
}
