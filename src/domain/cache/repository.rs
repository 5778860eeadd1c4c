//! Object cache trait definition

use std::fmt::{Debug, Display};

use async_trait::async_trait;
use serde_json::Value;

use super::collection::Collection;
use super::filter::CacheFilter;
use super::key::CollectionKey;
use super::outcome::{CacheLookup, CachingSupport, Mutation};
use super::registry::SupportedResources;
use crate::domain::DomainError;

/// Attribute-level object cache keyed by category and resource
///
/// `Ok` results carry the tagged outcome; `Err` is reserved for failures of the
/// cache itself (e.g. a poisoned lock), never for a plain miss.
#[async_trait]
pub trait ObjectCache: Send + Sync + Debug + Display {
    /// Name this cache binds registry entries under (e.g. "local")
    fn name(&self) -> &str;

    /// Replaces the opaque configuration value
    fn set_config(&self, config: Value) -> Result<(), DomainError>;

    /// Returns the opaque configuration value, if any
    fn config(&self) -> Result<Option<Value>, DomainError>;

    /// Resource plural names bound at construction
    fn supported_resources(&self) -> &SupportedResources;

    /// Collection keys in binding order
    fn collection_keys(&self) -> Vec<CollectionKey>;

    /// Whether category/resource is served by this cache
    async fn is_caching_supported(
        &self,
        category: &str,
        resource: &str,
    ) -> Result<CachingSupport, DomainError>;

    /// Reads cached objects matching the filter
    async fn get(
        &self,
        category: &str,
        resource: &str,
        filter: &CacheFilter,
    ) -> Result<CacheLookup, DomainError>;

    /// Inserts or replaces objects by key
    async fn add(
        &self,
        category: &str,
        resource: &str,
        data: Collection,
    ) -> Result<Mutation, DomainError>;

    /// Reserved for attribute-level updates; performs no mutation
    async fn update(
        &self,
        category: &str,
        resource: &str,
        data: Collection,
    ) -> Result<Mutation, DomainError>;

    /// Deletes the objects named by the keys of `data`
    async fn remove(
        &self,
        category: &str,
        resource: &str,
        data: Collection,
    ) -> Result<Mutation, DomainError>;

    /// Empties every collection, keeping the collection keys
    async fn clean(&self) -> Result<(), DomainError>;
}
