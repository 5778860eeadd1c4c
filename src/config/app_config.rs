use serde::Deserialize;

use crate::domain::cache::{CacheEntry, StaticResourceRegistry};
use crate::infrastructure::cache::CacheSettings;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub cache: CacheSettings,
    pub registry: RegistryConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Cacheable resource declarations
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub entries: Vec<CacheEntry>,
}

impl RegistryConfig {
    /// Builds a registry from the configured entries
    pub fn to_registry(&self) -> StaticResourceRegistry {
        StaticResourceRegistry::new(self.entries.clone())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from("config/default", "config/local")
    }

    /// Loads configuration from the given base/override files plus `APP__*` env vars
    pub fn load_from(default_file: &str, local_file: &str) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(default_file).required(false))
            .add_source(config::File::with_name(local_file).required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
