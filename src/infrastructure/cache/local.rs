//! Local in-process object cache

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::domain::cache::{
    AttributeSet, CacheFilter, CacheLookup, Candidate, CachingSupport, Collection, CollectionKey,
    Mutation, ObjectCache, Policy, PolicyArgs, PolicyKind, ResourceRegistry, SupportedResources,
};
use crate::domain::DomainError;
use crate::infrastructure::observability::{
    record_cache_lookup, record_cache_mutation, CacheMetricParams,
};

/// Default name local cache entries are registered under
pub const LOCAL_CACHE_NAME: &str = "local";

/// Configuration for the local cache
#[derive(Debug, Clone)]
pub struct LocalCacheConfig {
    /// Name matched against registry entries' `cache_type`
    pub name: String,
    /// Read policy applied to raw lookups
    pub policy: PolicyKind,
}

impl Default for LocalCacheConfig {
    fn default() -> Self {
        Self {
            name: LOCAL_CACHE_NAME.to_string(),
            policy: PolicyKind::default(),
        }
    }
}

impl LocalCacheConfig {
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
}

/// Thread-safe local cache of attribute sets grouped per resource collection
///
/// The set of collections is fixed at construction from the registry binding.
/// Each collection has its own lock: reads hold the read lock for the whole
/// scan, writes hold the write lock, so a read never observes a half-applied
/// batch.
pub struct LocalCache {
    name: String,
    supported: SupportedResources,
    collections: BTreeMap<CollectionKey, RwLock<Collection>>,
    config: RwLock<Option<Value>>,
    policy: Arc<dyn Policy>,
}

impl LocalCache {
    /// Creates a local cache bound to the registry with default configuration
    pub fn new(registry: &dyn ResourceRegistry) -> Self {
        Self::with_config(LocalCacheConfig::default(), registry)
    }

    /// Creates a local cache with the given configuration
    pub fn with_config(config: LocalCacheConfig, registry: &dyn ResourceRegistry) -> Self {
        Self::with_policy(&config.name, registry, config.policy.build())
    }

    /// Creates a local cache that applies a custom read policy
    pub fn with_policy(
        name: &str,
        registry: &dyn ResourceRegistry,
        policy: Arc<dyn Policy>,
    ) -> Self {
        let supported = SupportedResources::bind(name, registry);

        let collections = supported
            .plurals()
            .map(|plural| (CollectionKey::for_plural(plural), RwLock::new(Collection::new())))
            .collect();

        info!(
            cache = name,
            resources = supported.len(),
            policy = policy.name(),
            "Local cache initialized"
        );

        Self {
            name: name.to_string(),
            supported,
            collections,
            config: RwLock::new(None),
            policy,
        }
    }

    fn metric_params<'a>(&'a self, key: Option<&'a CollectionKey>) -> CacheMetricParams<'a> {
        CacheMetricParams {
            cache: &self.name,
            resource: key.map(CollectionKey::plural),
        }
    }

    /// Resolves category/resource to its collection, logging when unsupported
    fn resolve(
        &self,
        category: &str,
        resource: &str,
    ) -> Option<(&CollectionKey, &RwLock<Collection>)> {
        let resolved = self
            .supported
            .collection_key(category, resource)
            .and_then(|key| self.collections.get_key_value(&key));

        if resolved.is_none() {
            warn!(
                cache = %self.name,
                category,
                resource,
                "Cannot find entries for key in cache"
            );
        }

        resolved
    }

    fn read<'a>(
        lock: &'a RwLock<Collection>,
    ) -> Result<RwLockReadGuard<'a, Collection>, DomainError> {
        lock.read()
            .map_err(|e| DomainError::cache(format!("Failed to acquire read lock: {}", e)))
    }

    fn write<'a>(
        lock: &'a RwLock<Collection>,
    ) -> Result<RwLockWriteGuard<'a, Collection>, DomainError> {
        lock.write()
            .map_err(|e| DomainError::cache(format!("Failed to acquire write lock: {}", e)))
    }

    /// Looks up every target key under a single read lock
    fn lookup(collection: &Collection, filter: &CacheFilter) -> (Candidate, usize) {
        let targets: Vec<&String> = match filter.ids() {
            Some(ids) => ids.iter().collect(),
            None => collection.keys().collect(),
        };

        let mut candidate = Candidate::default();

        for key in &targets {
            match collection.get(key) {
                Some(attributes) => candidate.hits.push(((*key).clone(), attributes.clone())),
                None => candidate.misses.push((*key).clone()),
            }
        }

        (candidate, targets.len())
    }

    /// Copies the collection once the write guard has been released
    fn snapshot(lock: &RwLock<Collection>) -> Result<Collection, DomainError> {
        Ok(Self::read(lock)?.clone())
    }
}

/// Keeps only the requested attributes that are actually present
fn project(attributes: AttributeSet, requested: Option<&[String]>) -> AttributeSet {
    match requested {
        None => attributes,
        Some(names) => attributes
            .into_iter()
            .filter(|(name, _)| names.contains(name))
            .collect(),
    }
}

#[async_trait]
impl ObjectCache for LocalCache {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_config(&self, config: Value) -> Result<(), DomainError> {
        let mut current = self
            .config
            .write()
            .map_err(|e| DomainError::cache(format!("Failed to acquire write lock: {}", e)))?;

        *current = Some(config);
        Ok(())
    }

    fn config(&self) -> Result<Option<Value>, DomainError> {
        let current = self
            .config
            .read()
            .map_err(|e| DomainError::cache(format!("Failed to acquire read lock: {}", e)))?;

        Ok(current.clone())
    }

    fn supported_resources(&self) -> &SupportedResources {
        &self.supported
    }

    fn collection_keys(&self) -> Vec<CollectionKey> {
        self.collections.keys().cloned().collect()
    }

    async fn is_caching_supported(
        &self,
        category: &str,
        resource: &str,
    ) -> Result<CachingSupport, DomainError> {
        let Some(key) = self.supported.collection_key(category, resource) else {
            return Ok(CachingSupport::Unknown);
        };

        if self.collections.contains_key(&key) {
            Ok(CachingSupport::Supported)
        } else {
            Ok(CachingSupport::Unsupported)
        }
    }

    async fn get(
        &self,
        category: &str,
        resource: &str,
        filter: &CacheFilter,
    ) -> Result<CacheLookup, DomainError> {
        let Some((key, lock)) = self.resolve(category, resource) else {
            record_cache_lookup(self.metric_params(None), "not_supported");
            return Ok(CacheLookup::NotSupported);
        };

        if filter.is_empty() {
            debug!(collection = %key, "Empty filter, unable to find any information in cache");
            record_cache_lookup(self.metric_params(Some(key)), "miss");
            return Ok(CacheLookup::Miss);
        }

        let (candidate, requested) = {
            let collection = Self::read(lock)?;
            Self::lookup(&collection, filter)
        };

        // An attribute-only read over an empty collection has nothing to reject
        let lookup = if requested == 0 {
            CacheLookup::Hit(Vec::new())
        } else {
            let args = PolicyArgs {
                category,
                resource,
                requested,
            };

            match self.policy.apply(candidate, &args) {
                Some(accepted) => CacheLookup::Hit(
                    accepted
                        .hits
                        .into_iter()
                        .map(|(id, attributes)| (id, project(attributes, filter.attrs())))
                        .collect(),
                ),
                None => CacheLookup::Miss,
            }
        };

        debug!(collection = %key, outcome = lookup.outcome(), "Cache lookup");
        record_cache_lookup(self.metric_params(Some(key)), lookup.outcome());

        Ok(lookup)
    }

    async fn add(
        &self,
        category: &str,
        resource: &str,
        data: Collection,
    ) -> Result<Mutation, DomainError> {
        let Some((key, lock)) = self.resolve(category, resource) else {
            return Ok(Mutation::NotSupported);
        };

        let added = data.len();

        {
            let mut collection = Self::write(lock)?;

            for (id, attributes) in data {
                collection.upsert(id, attributes);
            }

            debug!(collection = %key, added, size = collection.len(), "Added entries to cache");
        }

        record_cache_mutation(self.metric_params(Some(key)), "add");

        Ok(Mutation::Applied(Self::snapshot(lock)?))
    }

    async fn update(
        &self,
        category: &str,
        resource: &str,
        _data: Collection,
    ) -> Result<Mutation, DomainError> {
        let Some((key, _)) = self.resolve(category, resource) else {
            return Ok(Mutation::NotSupported);
        };

        debug!(collection = %key, "Update is not applied by the local cache");
        record_cache_mutation(self.metric_params(Some(key)), "update");

        Ok(Mutation::Ignored)
    }

    async fn remove(
        &self,
        category: &str,
        resource: &str,
        data: Collection,
    ) -> Result<Mutation, DomainError> {
        let Some((key, lock)) = self.resolve(category, resource) else {
            return Ok(Mutation::NotSupported);
        };

        let missing = Self::write(lock)?.remove_all(data.keys().map(String::as_str));

        for id in missing {
            debug!(collection = %key, id, "Key not cached, nothing to remove");
        }

        record_cache_mutation(self.metric_params(Some(key)), "remove");

        Ok(Mutation::Applied(Self::snapshot(lock)?))
    }

    async fn clean(&self) -> Result<(), DomainError> {
        for (key, lock) in &self.collections {
            Self::write(lock)?.clear();
            record_cache_mutation(self.metric_params(Some(key)), "clean");
        }

        info!(cache = %self.name, collections = self.collections.len(), "Cache cleaned");
        Ok(())
    }
}

impl fmt::Debug for LocalCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalCache")
            .field("name", &self.name)
            .field("supported", &self.supported)
            .field("collections", &self.collection_keys())
            .field("policy", &self.policy.name())
            .finish()
    }
}

impl fmt::Display for LocalCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys: Vec<&str> = self.collections.keys().map(CollectionKey::as_str).collect();
        writeln!(f, "{} {:?}", self.name, keys)?;

        for (key, lock) in &self.collections {
            match lock.read() {
                Ok(collection) => writeln!(f, "{} => {}", key, collection)?,
                Err(_) => writeln!(f, "{} => <poisoned>", key)?,
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cache::{CacheEntry, PartialHitPolicy, StaticResourceRegistry};
    use serde_json::json;

    fn registry() -> StaticResourceRegistry {
        StaticResourceRegistry::new(vec![
            CacheEntry::new("local", "controls", "Control"),
            CacheEntry::new("local", "policies", "Policy"),
            CacheEntry::new("memcache", "programs", "Program"),
        ])
    }

    fn attrs(value: Value) -> AttributeSet {
        value.as_object().cloned().unwrap()
    }

    fn data(entries: Value) -> Collection {
        entries
            .as_object()
            .unwrap()
            .iter()
            .map(|(k, v)| (k.clone(), attrs(v.clone())))
            .collect()
    }

    async fn seeded() -> LocalCache {
        let cache = LocalCache::new(&registry());
        cache
            .add("sox", "controls", data(json!({"A": {"x": 1, "y": 2}})))
            .await
            .unwrap();
        cache
    }

    #[test]
    fn test_construction_binds_collections() {
        let cache = LocalCache::new(&registry());

        assert_eq!(cache.name(), "local");
        assert_eq!(
            cache.collection_keys(),
            vec![
                CollectionKey::for_plural("controls"),
                CollectionKey::for_plural("policies")
            ]
        );
    }

    #[test]
    fn test_instances_own_their_state() {
        let local = LocalCache::new(&registry());
        let other = LocalCache::with_config(
            LocalCacheConfig::default().with_name("memcache"),
            &registry(),
        );

        assert_eq!(local.supported_resources().len(), 2);
        assert_eq!(other.supported_resources().len(), 1);
        assert_eq!(other.collection_keys(), vec![CollectionKey::for_plural("programs")]);
    }

    #[test]
    fn test_config_roundtrip() {
        let cache = LocalCache::new(&registry());
        assert_eq!(cache.config().unwrap(), None);

        cache.set_config(json!({"ttl": 30})).unwrap();
        assert_eq!(cache.config().unwrap(), Some(json!({"ttl": 30})));
    }

    #[tokio::test]
    async fn test_is_caching_supported() {
        let cache = LocalCache::new(&registry());

        assert_eq!(
            cache.is_caching_supported("sox", "controls").await.unwrap(),
            CachingSupport::Supported
        );
        assert_eq!(
            cache.is_caching_supported("sox", "control").await.unwrap(),
            CachingSupport::Supported
        );
        assert_eq!(
            cache.is_caching_supported("sox", "programs").await.unwrap(),
            CachingSupport::Unknown
        );
    }

    #[test]
    fn test_is_caching_supported_rejects_empty_names() {
        let cache = LocalCache::new(&registry());

        let support = tokio_test::block_on(cache.is_caching_supported("", "controls")).unwrap();
        assert_eq!(support, CachingSupport::Unknown);
    }

    #[tokio::test]
    async fn test_empty_collection_is_still_supported() {
        let cache = LocalCache::new(&registry());
        cache.clean().await.unwrap();

        assert_eq!(
            cache.is_caching_supported("sox", "policies").await.unwrap(),
            CachingSupport::Supported
        );
    }

    #[tokio::test]
    async fn test_get_all_or_none() {
        let cache = LocalCache::new(&registry());
        cache
            .add("sox", "controls", data(json!({"A": {"x": 1}})))
            .await
            .unwrap();

        let filter = CacheFilter::new().with_ids(["A", "B"]);
        let result = cache.get("sox", "controls", &filter).await.unwrap();

        assert_eq!(result, CacheLookup::Miss);
    }

    #[tokio::test]
    async fn test_get_projection_drops_missing_attrs() {
        let cache = seeded().await;

        let filter = CacheFilter::new().with_ids(["A"]).with_attrs(["x", "z"]);
        let result = cache.get("sox", "controls", &filter).await.unwrap();

        assert_eq!(
            result,
            CacheLookup::Hit(vec![("A".to_string(), attrs(json!({"x": 1})))])
        );
    }

    #[tokio::test]
    async fn test_get_default_projection() {
        let cache = seeded().await;

        let filter = CacheFilter::new().with_ids(["A"]);
        let result = cache.get("sox", "controls", &filter).await.unwrap();

        assert_eq!(
            result,
            CacheLookup::Hit(vec![("A".to_string(), attrs(json!({"x": 1, "y": 2})))])
        );
    }

    #[tokio::test]
    async fn test_get_preserves_requested_order() {
        let cache = LocalCache::new(&registry());
        cache
            .add("sox", "controls", data(json!({"1": {"n": 1}, "2": {"n": 2}, "3": {"n": 3}})))
            .await
            .unwrap();

        let filter = CacheFilter::new().with_ids(["3", "1"]);
        let result = cache.get("sox", "controls", &filter).await.unwrap();
        let keys: Vec<String> = result.into_hit().unwrap().into_iter().map(|(k, _)| k).collect();

        assert_eq!(keys, vec!["3", "1"]);
    }

    #[tokio::test]
    async fn test_get_all_keys_with_attr_filter() {
        let cache = LocalCache::new(&registry());
        cache
            .add("sox", "controls", data(json!({"A": {"x": 1, "y": 2}})))
            .await
            .unwrap();
        cache
            .add("sox", "controls", data(json!({"B": {"y": 3}})))
            .await
            .unwrap();

        let filter = CacheFilter::new().with_attrs(["y"]);
        let result = cache.get("sox", "controls", &filter).await.unwrap();

        assert_eq!(
            result,
            CacheLookup::Hit(vec![
                ("A".to_string(), attrs(json!({"y": 2}))),
                ("B".to_string(), attrs(json!({"y": 3}))),
            ])
        );
    }

    #[tokio::test]
    async fn test_get_empty_filter_is_miss() {
        let cache = seeded().await;

        let result = cache.get("sox", "controls", &CacheFilter::new()).await.unwrap();
        assert_eq!(result, CacheLookup::Miss);
    }

    #[tokio::test]
    async fn test_get_all_keys_on_empty_collection_is_empty_hit() {
        let cache = LocalCache::new(&registry());

        let filter = CacheFilter::new().with_attrs(["x"]);
        let result = cache.get("sox", "policies", &filter).await.unwrap();

        assert_eq!(result, CacheLookup::Hit(Vec::new()));
    }

    #[tokio::test]
    async fn test_get_all_keys_on_empty_collection_with_partial_hit_policy() {
        let cache = LocalCache::with_policy("local", &registry(), Arc::new(PartialHitPolicy));

        let filter = CacheFilter::new().with_attrs(["x"]);
        let result = cache.get("sox", "controls", &filter).await.unwrap();

        assert_eq!(result, CacheLookup::Hit(Vec::new()));
    }

    #[tokio::test]
    async fn test_get_does_not_grow_collection() {
        let cache = seeded().await;

        let filter = CacheFilter::new().with_ids(["A", "B"]);
        cache.get("sox", "controls", &filter).await.unwrap();

        let remaining = cache
            .remove("sox", "controls", Collection::new())
            .await
            .unwrap();
        assert_eq!(remaining.collection().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_add_replaces_instead_of_merging() {
        let cache = LocalCache::new(&registry());
        cache
            .add("sox", "controls", data(json!({"A": {"x": 1}})))
            .await
            .unwrap();

        let result = cache
            .add("sox", "controls", data(json!({"A": {"y": 2}})))
            .await
            .unwrap();

        assert_eq!(
            result.collection().unwrap().get("A"),
            Some(&attrs(json!({"y": 2})))
        );
    }

    #[tokio::test]
    async fn test_update_is_a_placeholder() {
        let cache = seeded().await;

        let result = cache
            .update("sox", "controls", data(json!({"A": {"x": 9}})))
            .await
            .unwrap();
        assert_eq!(result, Mutation::Ignored);

        let filter = CacheFilter::new().with_ids(["A"]).with_attrs(["x"]);
        let lookup = cache.get("sox", "controls", &filter).await.unwrap();
        assert_eq!(
            lookup,
            CacheLookup::Hit(vec![("A".to_string(), attrs(json!({"x": 1})))])
        );
    }

    #[tokio::test]
    async fn test_remove_deletes_exactly_named_keys() {
        let cache = LocalCache::new(&registry());
        cache
            .add("sox", "controls", data(json!({"A": {"x": 1}, "B": {"x": 2}})))
            .await
            .unwrap();

        let result = cache
            .remove("sox", "controls", data(json!({"A": {}})))
            .await
            .unwrap();

        let keys: Vec<&String> = result.collection().unwrap().keys().collect();
        assert_eq!(keys, vec!["B"]);
    }

    #[tokio::test]
    async fn test_remove_missing_key_is_ignored() {
        let cache = seeded().await;

        let result = cache
            .remove("sox", "controls", data(json!({"missing": {}, "A": {}})))
            .await
            .unwrap();

        assert!(result.is_applied());
        assert!(result.collection().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_remove_large_batch() {
        let cache = LocalCache::new(&registry());
        let batch: Collection = (0..50_000)
            .map(|i| (i.to_string(), attrs(json!({"n": i}))))
            .collect();
        cache.add("sox", "controls", batch).await.unwrap();

        let evens: Collection = (0..50_000)
            .step_by(2)
            .map(|i| (i.to_string(), AttributeSet::new()))
            .collect();

        let started = std::time::Instant::now();
        let result = cache.remove("sox", "controls", evens).await.unwrap();
        assert!(started.elapsed() < std::time::Duration::from_secs(2));

        let remaining = result.collection().unwrap();
        assert_eq!(remaining.len(), 25_000);
        assert_eq!(remaining.keys().next().map(String::as_str), Some("1"));
    }

    #[tokio::test]
    async fn test_mutation_releases_write_lock() {
        let cache = seeded().await;

        let result = cache
            .add("sox", "controls", data(json!({"B": {"x": 2}})))
            .await
            .unwrap();
        assert_eq!(result.collection().unwrap().len(), 2);

        let (_, lock) = cache.resolve("sox", "controls").unwrap();
        assert!(lock.try_write().is_ok());
    }

    #[tokio::test]
    async fn test_unsupported_resource_is_not_mutated() {
        let cache = seeded().await;
        let before = cache.to_string();

        let filter = CacheFilter::new().with_ids(["A"]);
        assert_eq!(
            cache.get("sox", "programs", &filter).await.unwrap(),
            CacheLookup::NotSupported
        );
        assert_eq!(
            cache
                .add("sox", "programs", data(json!({"A": {"x": 1}})))
                .await
                .unwrap(),
            Mutation::NotSupported
        );
        assert_eq!(
            cache
                .remove("sox", "programs", data(json!({"A": {}})))
                .await
                .unwrap(),
            Mutation::NotSupported
        );
        assert_eq!(
            cache
                .update("sox", "programs", Collection::new())
                .await
                .unwrap(),
            Mutation::NotSupported
        );

        assert_eq!(cache.to_string(), before);
    }

    #[tokio::test]
    async fn test_clean_resets_contents_not_structure() {
        let cache = seeded().await;
        let keys_before = cache.collection_keys();
        let supported_before = cache.supported_resources().clone();

        cache.clean().await.unwrap();

        assert_eq!(cache.collection_keys(), keys_before);
        assert_eq!(cache.supported_resources(), &supported_before);
        assert_eq!(cache.name(), "local");

        let filter = CacheFilter::new().with_ids(["A"]);
        assert_eq!(
            cache.get("sox", "controls", &filter).await.unwrap(),
            CacheLookup::Miss
        );
    }

    #[tokio::test]
    async fn test_clean_is_idempotent() {
        let cache = seeded().await;

        cache.clean().await.unwrap();
        let once = cache.to_string();

        cache.clean().await.unwrap();
        assert_eq!(cache.to_string(), once);
    }

    #[tokio::test]
    async fn test_partial_hit_policy() {
        let cache = LocalCache::with_policy("local", &registry(), Arc::new(PartialHitPolicy));
        cache
            .add("sox", "controls", data(json!({"A": {"x": 1}})))
            .await
            .unwrap();

        let filter = CacheFilter::new().with_ids(["A", "B"]);
        let result = cache.get("sox", "controls", &filter).await.unwrap();

        assert_eq!(
            result,
            CacheLookup::Hit(vec![("A".to_string(), attrs(json!({"x": 1})))])
        );
    }

    #[tokio::test]
    async fn test_display_lists_collections() {
        let cache = seeded().await;
        let rendered = cache.to_string();

        assert!(rendered.starts_with("local [\"collection:controls\", \"collection:policies\"]"));
        assert!(rendered.contains(r#"collection:controls => {"A":{"x":1,"y":2}}"#));
        assert!(rendered.contains("collection:policies => {}"));
    }

    #[tokio::test]
    async fn test_concurrent_writers_and_readers() {
        let cache = Arc::new(LocalCache::new(&registry()));
        let mut handles = Vec::new();

        for i in 0..8 {
            let cache = cache.clone();
            handles.push(tokio::spawn(async move {
                let id = i.to_string();
                let mut entry = Collection::new();
                entry.upsert(id.clone(), attrs(json!({"n": i})));
                cache.add("sox", "controls", entry).await.unwrap();

                let filter = CacheFilter::new().with_ids([id]);
                cache.get("sox", "controls", &filter).await.unwrap()
            }));
        }

        for handle in handles {
            assert!(handle.await.unwrap().is_hit());
        }
    }
}
