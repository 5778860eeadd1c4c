//! Tagged results of cache operations

use serde::Serialize;

use super::collection::{AttributeSet, Collection, ObjectKey};

/// Answer to "can this category/resource be cached here?"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CachingSupport {
    /// A collection exists for the resource
    Supported,
    /// The resource resolves to a key but no collection backs it
    Unsupported,
    /// The resource is not a cacheable type for this cache
    Unknown,
}

impl CachingSupport {
    pub fn is_supported(&self) -> bool {
        matches!(self, Self::Supported)
    }
}

/// Ordered result of a read: object key to projected attribute set
pub type ResultSet = Vec<(ObjectKey, AttributeSet)>;

/// Outcome of a cache read
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum CacheLookup {
    /// Every requested object was cached
    Hit(#[serde(serialize_with = "serialize_result_set")] ResultSet),
    /// At least one requested object is missing, or the filter selected nothing
    Miss,
    /// The category/resource is not cached by this cache
    NotSupported,
}

impl CacheLookup {
    pub fn is_hit(&self) -> bool {
        matches!(self, Self::Hit(_))
    }

    /// Returns the hit data, treating `Miss` and `NotSupported` alike
    pub fn into_hit(self) -> Option<ResultSet> {
        match self {
            Self::Hit(data) => Some(data),
            Self::Miss | Self::NotSupported => None,
        }
    }

    /// Label used for logs and metrics
    pub fn outcome(&self) -> &'static str {
        match self {
            Self::Hit(_) => "hit",
            Self::Miss => "miss",
            Self::NotSupported => "not_supported",
        }
    }
}

/// Outcome of a cache write
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "collection", rename_all = "snake_case")]
pub enum Mutation {
    /// The write was applied; carries the collection as it stands afterwards
    Applied(Collection),
    /// The operation is accepted but performs no mutation
    Ignored,
    /// The category/resource is not cached by this cache
    NotSupported,
}

impl Mutation {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }

    pub fn collection(&self) -> Option<&Collection> {
        match self {
            Self::Applied(collection) => Some(collection),
            Self::Ignored | Self::NotSupported => None,
        }
    }
}

fn serialize_result_set<S>(data: &ResultSet, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    use serde::ser::SerializeMap;

    let mut map = serializer.serialize_map(Some(data.len()))?;

    for (key, attributes) in data {
        map.serialize_entry(key, attributes)?;
    }

    map.end()
}
