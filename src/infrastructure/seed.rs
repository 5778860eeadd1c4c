//! JSON seed files used to pre-populate a cache

use std::path::Path;

use serde_json::Value;
use tracing::warn;

use crate::domain::cache::{Collection, Mutation, ObjectCache};
use crate::domain::DomainError;

/// Parses a seed document of the form `{"<resource>": {"<key>": {attrs}}}`
pub fn parse_seed(value: &Value) -> Result<Vec<(String, Collection)>, DomainError> {
    let resources = value
        .as_object()
        .ok_or_else(|| DomainError::validation("Seed must be a JSON object of resources"))?;

    resources
        .iter()
        .map(|(resource, objects)| {
            let objects = objects.as_object().ok_or_else(|| {
                DomainError::validation(format!(
                    "Seed resource '{}' must map object keys to attributes",
                    resource
                ))
            })?;

            let collection = objects
                .iter()
                .map(|(key, attributes)| match attributes {
                    Value::Object(attributes) => Ok((key.clone(), attributes.clone())),
                    other => Err(DomainError::validation(format!(
                        "Seed object '{}/{}' must be a JSON object, got {}",
                        resource, key, other
                    ))),
                })
                .collect::<Result<Collection, DomainError>>()?;

            Ok((resource.clone(), collection))
        })
        .collect()
}

/// Reads and parses a seed file
pub fn read_seed(path: &Path) -> Result<Vec<(String, Collection)>, DomainError> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        DomainError::not_found(format!("Seed file '{}': {}", path.display(), e))
    })?;

    let value: Value = serde_json::from_str(&raw).map_err(|e| {
        DomainError::validation(format!("Seed file '{}' is not valid JSON: {}", path.display(), e))
    })?;

    parse_seed(&value)
}

/// Adds every seeded resource to the cache, returning how many objects were loaded
pub async fn load_seed(
    cache: &dyn ObjectCache,
    category: &str,
    seed: Vec<(String, Collection)>,
) -> Result<usize, DomainError> {
    let mut loaded = 0;

    for (resource, collection) in seed {
        let count = collection.len();

        match cache.add(category, &resource, collection).await? {
            Mutation::Applied(_) => loaded += count,
            Mutation::Ignored | Mutation::NotSupported => {
                warn!(category, resource = %resource, "Seed resource is not cacheable, skipped");
            }
        }
    }

    Ok(loaded)
}
