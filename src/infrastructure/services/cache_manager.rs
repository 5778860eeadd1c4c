//! Read-through cache manager

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::domain::cache::{
    CacheFilter, CacheLookup, Collection, ObjectCache, ObjectKey, ResourceStore, ResultSet,
};
use crate::domain::DomainError;

/// Configuration for the cache manager
#[derive(Debug, Clone)]
pub struct CacheManagerConfig {
    /// Whether store results are written back into the cache
    pub populate_on_miss: bool,
    /// Whether caches are consulted at all
    pub enabled: bool,
}

impl Default for CacheManagerConfig {
    fn default() -> Self {
        Self {
            populate_on_miss: true,
            enabled: true,
        }
    }
}

impl CacheManagerConfig {
    /// Stops writing store results back into the cache
    pub fn without_population(mut self) -> Self {
        self.populate_on_miss = false;
        self
    }

    /// Disables caching; every fetch goes to the store
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// Where a fetched result came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchSource {
    Cache,
    Store,
}

/// Result of a read-through fetch
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched {
    pub source: FetchSource,
    pub data: ResultSet,
}

/// Selects a cache per resource and falls back to the store on a miss
#[derive(Debug)]
pub struct CacheManager {
    caches: Vec<Arc<dyn ObjectCache>>,
    config: CacheManagerConfig,
}

impl CacheManager {
    /// Creates a manager over the given caches, consulted in order
    pub fn new(caches: Vec<Arc<dyn ObjectCache>>) -> Self {
        Self::with_config(caches, CacheManagerConfig::default())
    }

    /// Creates a manager with custom config
    pub fn with_config(caches: Vec<Arc<dyn ObjectCache>>, config: CacheManagerConfig) -> Self {
        Self { caches, config }
    }

    pub fn caches(&self) -> &[Arc<dyn ObjectCache>] {
        &self.caches
    }

    /// Returns the first cache that supports category/resource
    pub async fn select(
        &self,
        category: &str,
        resource: &str,
    ) -> Result<Option<Arc<dyn ObjectCache>>, DomainError> {
        if !self.config.enabled {
            return Ok(None);
        }

        for cache in &self.caches {
            if cache.is_caching_supported(category, resource).await?.is_supported() {
                return Ok(Some(cache.clone()));
            }
        }

        Ok(None)
    }

    /// Serves the read from cache when possible, otherwise from the store
    pub async fn fetch(
        &self,
        category: &str,
        resource: &str,
        filter: &CacheFilter,
        store: &dyn ResourceStore,
    ) -> Result<Fetched, DomainError> {
        let cache = self.select(category, resource).await?;

        if let Some(cache) = &cache {
            if let CacheLookup::Hit(data) = cache.get(category, resource, filter).await? {
                debug!(cache = cache.name(), category, resource, "Served from cache");
                return Ok(Fetched {
                    source: FetchSource::Cache,
                    data,
                });
            }
        }

        let rows = store.fetch(category, resource, filter).await?;
        debug!(category, resource, rows = rows.len(), "Served from store");

        if let Some(cache) = &cache {
            if self.config.populate_on_miss && filter.attrs().is_none() {
                cache.add(category, resource, rows.clone()).await?;
            }
        }

        Ok(Fetched {
            source: FetchSource::Store,
            data: rows.into_iter().collect(),
        })
    }

    /// Drops the given keys from the cache serving category/resource
    ///
    /// Returns `false` when no cache serves the resource.
    pub async fn invalidate(
        &self,
        category: &str,
        resource: &str,
        keys: &[ObjectKey],
    ) -> Result<bool, DomainError> {
        let Some(cache) = self.select(category, resource).await? else {
            return Ok(false);
        };

        let targets: Collection = keys
            .iter()
            .map(|key| (key.clone(), Default::default()))
            .collect();

        Ok(cache.remove(category, resource, targets).await?.is_applied())
    }

    /// Cleans every managed cache
    pub async fn clean_all(&self) -> Result<(), DomainError> {
        for cache in &self.caches {
            cache.clean().await?;
        }

        info!(caches = self.caches.len(), "All caches cleaned");
        Ok(())
    }
}
