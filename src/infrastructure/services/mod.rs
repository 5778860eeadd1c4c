//! Infrastructure services

mod cache_manager;

pub use cache_manager::{CacheManager, CacheManagerConfig, FetchSource, Fetched};
