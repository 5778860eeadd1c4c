//! Cache factory for runtime selection

use std::sync::Arc;

use serde::Deserialize;

use crate::domain::cache::{ObjectCache, PolicyKind, ResourceRegistry};
use crate::domain::DomainError;

use super::local::{LocalCache, LocalCacheConfig, LOCAL_CACHE_NAME};

/// Supported cache types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheType {
    /// In-process cache with per-collection locks
    #[default]
    Local,
}

impl std::fmt::Display for CacheType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheType::Local => write!(f, "local"),
        }
    }
}

impl std::str::FromStr for CacheType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" | "in_memory" | "inmemory" | "memory" => Ok(CacheType::Local),
            _ => Err(DomainError::configuration(format!(
                "Unknown cache type: {}. Valid types: local",
                s
            ))),
        }
    }
}

/// Configuration for cache factory
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Type of cache to create
    pub cache_type: CacheType,
    /// Name matched against registry entries
    pub name: String,
    /// Read policy
    pub policy: PolicyKind,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_type: CacheType::Local,
            name: LOCAL_CACHE_NAME.to_string(),
            policy: PolicyKind::AllOrNone,
        }
    }
}

impl CacheConfig {
    /// Creates a new configuration for a local cache
    pub fn local() -> Self {
        Self::default()
    }

    /// Sets the cache name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the read policy
    pub fn with_policy(mut self, policy: PolicyKind) -> Self {
        self.policy = policy;
        self
    }

    /// Builds the factory config from raw strings, as read from settings
    pub fn from_settings(settings: &CacheSettings) -> Result<Self, DomainError> {
        Ok(Self {
            cache_type: settings.cache_type.parse()?,
            name: settings.name.clone(),
            policy: settings.policy.parse()?,
        })
    }
}

/// Raw cache settings as deserialized from configuration sources
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub cache_type: String,
    pub name: String,
    pub policy: String,
}

impl Default for CacheSettings {
    fn default() -> Self {
        let config = CacheConfig::default();

        Self {
            cache_type: config.cache_type.to_string(),
            name: config.name,
            policy: config.policy.to_string(),
        }
    }
}

/// Factory for creating cache instances
#[derive(Debug, Default)]
pub struct CacheFactory;

impl CacheFactory {
    /// Creates a new cache factory
    pub fn new() -> Self {
        Self
    }

    /// Creates a cache instance based on configuration
    pub fn create(
        &self,
        config: &CacheConfig,
        registry: &dyn ResourceRegistry,
    ) -> Arc<dyn ObjectCache> {
        match config.cache_type {
            CacheType::Local => {
                let local_config = LocalCacheConfig::default()
                    .with_name(config.name.clone())
                    .with_policy(config.policy);

                Arc::new(LocalCache::with_config(local_config, registry))
            }
        }
    }
}
