//! Resource Cache
//!
//! An in-process, attribute-level object cache that sits in front of a slower
//! persistent store:
//! - Per-resource collections bound from a resource registry
//! - All-or-none reads with attribute projection
//! - Pluggable read policies
//! - Read-through cache manager with store fallback

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use domain::cache::ObjectCache;
use infrastructure::cache::{CacheConfig, CacheFactory};
use infrastructure::services::CacheManager;
use tracing::info;

/// Create the configured cache bound to the configured registry
pub fn create_cache(config: &AppConfig) -> anyhow::Result<Arc<dyn ObjectCache>> {
    let cache_config = CacheConfig::from_settings(&config.cache)?;
    let registry = config.registry.to_registry();

    let cache = CacheFactory::new().create(&cache_config, &registry);

    info!(
        cache = cache.name(),
        cache_type = %cache_config.cache_type,
        resources = cache.supported_resources().len(),
        "Cache created"
    );

    Ok(cache)
}

/// Create a cache manager over the configured cache
pub fn create_cache_manager(config: &AppConfig) -> anyhow::Result<CacheManager> {
    Ok(CacheManager::new(vec![create_cache(config)?]))
}
