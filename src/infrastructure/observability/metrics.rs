//! Cache metrics recorded through the `metrics` facade
//!
//! No exporter is installed here; counters are no-ops until the embedding
//! application installs a recorder.

use metrics::counter;

/// Labels shared by every cache metric
pub struct CacheMetricParams<'a> {
    /// Cache name (e.g. "local")
    pub cache: &'a str,
    /// Plural resource name, or `None` when the resource is not cacheable
    pub resource: Option<&'a str>,
}

impl CacheMetricParams<'_> {
    fn labels(&self, extra: (&'static str, &str)) -> [(&'static str, String); 3] {
        [
            ("cache", self.cache.to_string()),
            ("resource", resource_label(self.resource)),
            (extra.0, extra.1.to_string()),
        ]
    }
}

/// Record the outcome of a cache read (`hit`, `miss`, `not_supported`)
pub fn record_cache_lookup(params: CacheMetricParams<'_>, outcome: &str) {
    let labels = params.labels(("outcome", outcome));
    counter!("resource_cache_lookups_total", &labels).increment(1);
}

/// Record a cache write (`add`, `update`, `remove`, `clean`)
pub fn record_cache_mutation(params: CacheMetricParams<'_>, op: &str) {
    let labels = params.labels(("op", op));
    counter!("resource_cache_mutations_total", &labels).increment(1);
}

fn resource_label(resource: Option<&str>) -> String {
    resource.unwrap_or("unknown").to_string()
}
