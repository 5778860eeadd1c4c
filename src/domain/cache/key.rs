//! Collection key derivation

use std::fmt;

/// Prefix shared by every collection key
pub const COLLECTION_PREFIX: &str = "collection:";

/// Key of a per-resource collection (`collection:<plural>`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollectionKey(String);

impl CollectionKey {
    /// Builds the collection key for an already-pluralized resource name
    pub fn for_plural(plural: &str) -> Self {
        Self(format!("{}{}", COLLECTION_PREFIX, plural))
    }

    /// Returns the string representation of the key
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the plural resource name this key was built from
    pub fn plural(&self) -> &str {
        self.0.strip_prefix(COLLECTION_PREFIX).unwrap_or(&self.0)
    }
}

impl fmt::Display for CollectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Pluralizes a singular resource-type name using English suffix rules
pub fn pluralize(resource: &str) -> String {
    const SIBILANT_ENDINGS: [&str; 5] = ["s", "x", "z", "ch", "sh"];

    if let Some(stem) = resource.strip_suffix('y') {
        let before_y = stem.chars().last();

        if matches!(before_y, Some(c) if !"aeiou".contains(c)) {
            return format!("{}ies", stem);
        }
    }

    if SIBILANT_ENDINGS.iter().any(|ending| resource.ends_with(ending)) {
        return format!("{}es", resource);
    }

    format!("{}s", resource)
}
