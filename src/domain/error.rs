use thiserror::Error;

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Store error: {message}")]
    Store { message: String },

    #[error("Cache error: {message}")]
    Cache { message: String },
}

impl DomainError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    pub fn cache(message: impl Into<String>) -> Self {
        Self::Cache {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_error() {
        let error = DomainError::not_found("Seed file 'seed.json' not found");
        assert_eq!(error.to_string(), "Not found: Seed file 'seed.json' not found");
    }

    #[test]
    fn test_validation_error() {
        let error = DomainError::validation("ids must be an array");
        assert_eq!(error.to_string(), "Validation error: ids must be an array");
    }

    #[test]
    fn test_cache_error() {
        let error = DomainError::cache("Collection lock poisoned");
        assert_eq!(error.to_string(), "Cache error: Collection lock poisoned");
    }

    #[test]
    fn test_store_error() {
        let error = DomainError::store("connection refused");
        assert_eq!(error.to_string(), "Store error: connection refused");
    }
}
