//! Cache infrastructure - Cache implementations

mod factory;
mod local;

pub use factory::{CacheConfig, CacheFactory, CacheSettings, CacheType};
pub use local::{LocalCache, LocalCacheConfig, LOCAL_CACHE_NAME};
