//! Read filter: which objects to fetch and which attributes to project

use std::collections::HashSet;

use serde_json::Value;

use super::collection::ObjectKey;
use crate::domain::DomainError;

/// Filter applied to a cache read
///
/// `ids == None` means every cached object, `attrs == None` means every
/// attribute present. Empty lists are normalized to `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CacheFilter {
    ids: Option<Vec<ObjectKey>>,
    attrs: Option<Vec<String>>,
}

impl CacheFilter {
    /// Creates an empty filter (matches nothing meaningful)
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts the read to the given object keys, in order
    pub fn with_ids<I, K>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<ObjectKey>,
    {
        let mut seen = HashSet::new();
        let keys: Vec<ObjectKey> = ids
            .into_iter()
            .map(Into::into)
            .filter(|id: &ObjectKey| seen.insert(id.clone()))
            .collect();

        self.ids = if keys.is_empty() { None } else { Some(keys) };
        self
    }

    /// Restricts the projection to the given attribute names
    pub fn with_attrs<I, A>(mut self, attrs: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        let attrs: Vec<String> = attrs.into_iter().map(Into::into).collect();
        self.attrs = if attrs.is_empty() { None } else { Some(attrs) };
        self
    }

    /// Parses a filter from a JSON object of the form `{"ids": [...], "attrs": [...]}`
    pub fn from_value(value: &Value) -> Result<Self, DomainError> {
        let object = match value {
            Value::Null => return Ok(Self::new()),
            Value::Object(object) => object,
            other => {
                return Err(DomainError::validation(format!(
                    "Cache filter must be an object, got {}",
                    other
                )));
            }
        };

        let mut filter = Self::new();

        if let Some(ids) = object.get("ids") {
            filter = filter.with_ids(parse_list("ids", ids)?);
        }

        if let Some(attrs) = object.get("attrs") {
            filter = filter.with_attrs(parse_list("attrs", attrs)?);
        }

        Ok(filter)
    }

    pub fn ids(&self) -> Option<&[ObjectKey]> {
        self.ids.as_deref()
    }

    pub fn attrs(&self) -> Option<&[String]> {
        self.attrs.as_deref()
    }

    /// True when neither ids nor attrs were given
    pub fn is_empty(&self) -> bool {
        self.ids.is_none() && self.attrs.is_none()
    }
}

fn parse_list(field: &str, value: &Value) -> Result<Vec<String>, DomainError> {
    let items = match value {
        Value::Null => return Ok(Vec::new()),
        Value::Array(items) => items,
        other => {
            return Err(DomainError::validation(format!(
                "Cache filter field '{}' must be an array, got {}",
                field, other
            )));
        }
    };

    items
        .iter()
        .map(|item| match item {
            Value::String(s) => Ok(s.clone()),
            Value::Number(n) => Ok(n.to_string()),
            other => Err(DomainError::validation(format!(
                "Cache filter field '{}' contains unsupported value {}",
                field, other
            ))),
        })
        .collect()
}
