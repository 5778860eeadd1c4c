//! Resource registry and the per-cache binding of supported resources

use std::collections::BTreeMap;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::key::{pluralize, CollectionKey};

#[cfg(test)]
use mockall::automock;

/// Maximum length for a resource plural name
pub const MAX_PLURAL_LENGTH: usize = 64;

/// Plural names are lowercase identifiers
static PLURAL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z][a-z0-9_]*$").expect("plural name pattern is valid"));

/// Registry descriptor declaring a cacheable resource type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Name of the cache implementation the entry belongs to
    pub cache_type: String,
    /// Plural resource-type name (e.g. "controls")
    pub model_plural: String,
    /// Declared type name (e.g. "Control")
    pub class_name: String,
}

impl CacheEntry {
    pub fn new(
        cache_type: impl Into<String>,
        model_plural: impl Into<String>,
        class_name: impl Into<String>,
    ) -> Self {
        Self {
            cache_type: cache_type.into(),
            model_plural: model_plural.into(),
            class_name: class_name.into(),
        }
    }
}

/// Registry entry validation errors
#[derive(Debug, Clone, PartialEq)]
pub enum CacheEntryValidationError {
    /// Plural name is empty
    EmptyPlural,
    /// Plural name exceeds maximum length
    PluralTooLong { length: usize, max: usize },
    /// Plural name contains invalid characters
    InvalidPluralFormat { plural: String },
    /// Class name is empty
    EmptyClassName,
}

impl fmt::Display for CacheEntryValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPlural => write!(f, "Resource plural name cannot be empty"),
            Self::PluralTooLong { length, max } => {
                write!(
                    f,
                    "Resource plural name too long: {} characters (max {})",
                    length, max
                )
            }
            Self::InvalidPluralFormat { plural } => {
                write!(
                    f,
                    "Invalid resource plural name '{}': must be lowercase alphanumeric with underscores",
                    plural
                )
            }
            Self::EmptyClassName => write!(f, "Class name cannot be empty"),
        }
    }
}

impl std::error::Error for CacheEntryValidationError {}

/// Validate a registry entry
pub fn validate_cache_entry(entry: &CacheEntry) -> Result<(), CacheEntryValidationError> {
    let plural = entry.model_plural.as_str();

    if plural.is_empty() {
        return Err(CacheEntryValidationError::EmptyPlural);
    }

    if plural.len() > MAX_PLURAL_LENGTH {
        return Err(CacheEntryValidationError::PluralTooLong {
            length: plural.len(),
            max: MAX_PLURAL_LENGTH,
        });
    }

    if !PLURAL_PATTERN.is_match(plural) {
        return Err(CacheEntryValidationError::InvalidPluralFormat {
            plural: plural.to_string(),
        });
    }

    if entry.class_name.trim().is_empty() {
        return Err(CacheEntryValidationError::EmptyClassName);
    }

    Ok(())
}

/// Source of cache entry descriptors
#[cfg_attr(test, automock)]
pub trait ResourceRegistry: Send + Sync {
    /// Enumerates every declared cache entry
    fn entries(&self) -> Vec<CacheEntry>;
}

/// Registry backed by a fixed list of entries
#[derive(Debug, Clone, Default)]
pub struct StaticResourceRegistry {
    entries: Vec<CacheEntry>,
}

impl StaticResourceRegistry {
    pub fn new(entries: Vec<CacheEntry>) -> Self {
        Self { entries }
    }

    pub fn with_entry(mut self, entry: CacheEntry) -> Self {
        self.entries.push(entry);
        self
    }
}

impl ResourceRegistry for StaticResourceRegistry {
    fn entries(&self) -> Vec<CacheEntry> {
        self.entries.clone()
    }
}

/// Plural resource names a cache instance supports, mapped to their class names
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SupportedResources {
    resources: BTreeMap<String, String>,
}

impl SupportedResources {
    /// Binds the registry entries declared for the cache named `cache_name`
    pub fn bind(cache_name: &str, registry: &dyn ResourceRegistry) -> Self {
        let mut resources = BTreeMap::new();

        for entry in registry.entries() {
            if entry.cache_type != cache_name {
                continue;
            }

            if let Err(e) = validate_cache_entry(&entry) {
                tracing::warn!(
                    cache = cache_name,
                    plural = %entry.model_plural,
                    error = %e,
                    "Skipping invalid cache entry"
                );
                continue;
            }

            resources.insert(entry.model_plural, entry.class_name);
        }

        Self { resources }
    }

    /// Resolves a category/resource pair to its collection key
    ///
    /// The resource may be given in plural form or as a singular name that
    /// pluralizes to a supported plural.
    pub fn collection_key(&self, category: &str, resource: &str) -> Option<CollectionKey> {
        if category.is_empty() || resource.is_empty() {
            return None;
        }

        if self.resources.contains_key(resource) {
            return Some(CollectionKey::for_plural(resource));
        }

        let plural = pluralize(resource);

        if self.resources.contains_key(&plural) {
            Some(CollectionKey::for_plural(&plural))
        } else {
            None
        }
    }

    pub fn class_name(&self, plural: &str) -> Option<&str> {
        self.resources.get(plural).map(String::as_str)
    }

    /// Plural names in sorted order
    pub fn plurals(&self) -> impl Iterator<Item = &String> {
        self.resources.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.resources.iter()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}
