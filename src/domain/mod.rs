//! Domain layer - Cache contracts, entities and policies

pub mod cache;
pub mod error;

pub use cache::{
    AttributeSet, CacheEntry, CacheFilter, CacheLookup, CachingSupport, Collection,
    CollectionKey, Mutation, ObjectCache, ObjectKey, Policy, PolicyKind, ResourceRegistry,
    ResourceStore, StaticResourceRegistry, SupportedResources,
};
pub use error::DomainError;
