//! Observability infrastructure - Cache metrics

mod metrics;

pub use metrics::{record_cache_lookup, record_cache_mutation, CacheMetricParams};
