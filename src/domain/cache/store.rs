//! Authoritative store consulted on a cache miss

use async_trait::async_trait;

use super::collection::Collection;
use super::filter::CacheFilter;
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Backing data layer that owns the authoritative objects
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Fetches objects matching the filter, projected to the requested attributes
    async fn fetch(
        &self,
        category: &str,
        resource: &str,
        filter: &CacheFilter,
    ) -> Result<Collection, DomainError>;
}
