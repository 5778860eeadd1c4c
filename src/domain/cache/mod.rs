//! Cache domain - Attribute-level object cache abstraction layer

mod collection;
mod filter;
mod key;
mod outcome;
mod policy;
mod registry;
mod repository;
mod store;

pub use collection::{AttributeSet, Collection, ObjectKey};
pub use filter::CacheFilter;
pub use key::{pluralize, CollectionKey, COLLECTION_PREFIX};
pub use outcome::{CacheLookup, CachingSupport, Mutation, ResultSet};
pub use policy::{AllOrNonePolicy, Candidate, PartialHitPolicy, Policy, PolicyArgs, PolicyKind};
pub use registry::{
    validate_cache_entry, CacheEntry, CacheEntryValidationError, ResourceRegistry,
    StaticResourceRegistry, SupportedResources,
};
pub use repository::ObjectCache;
pub use store::ResourceStore;

#[cfg(test)]
pub use registry::MockResourceRegistry;
#[cfg(test)]
pub use store::MockResourceStore;
