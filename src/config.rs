use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use validator::Validate;

const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_MIN_CONNECTIONS: u32 = 1;
const DEFAULT_SEQUENCE_PAD_WIDTH: usize = 6;
const CONFIG_DIR: &str = "config";

/// Application configuration with validation.
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Database connection URL
    #[validate(length(min = 1))]
    pub database_url: String,

    /// Maximum number of pooled connections
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Minimum number of pooled connections
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    /// Application environment
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Logging level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log in JSON format (structured logging)
    #[serde(default)]
    pub log_json: bool,

    /// Whether to run database migrations on startup
    #[serde(default)]
    pub auto_migrate: bool,

    /// Zero-padding width of generated document references, e.g. 6 for
    /// `PO-000001`
    #[serde(default = "default_sequence_pad_width")]
    #[validate(range(min = 1, max = 12))]
    pub sequence_pad_width: usize,
}

fn default_max_connections() -> u32 {
    DEFAULT_MAX_CONNECTIONS
}

fn default_min_connections() -> u32 {
    DEFAULT_MIN_CONNECTIONS
}

fn default_environment() -> String {
    DEFAULT_ENV.to_string()
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_sequence_pad_width() -> usize {
    DEFAULT_SEQUENCE_PAD_WIDTH
}

impl AppConfig {
    /// Builds a configuration for the given database URL with defaults for
    /// everything else.
    pub fn for_database(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            min_connections: DEFAULT_MIN_CONNECTIONS,
            environment: DEFAULT_ENV.to_string(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_json: false,
            auto_migrate: false,
            sequence_pad_width: DEFAULT_SEQUENCE_PAD_WIDTH,
        }
    }

    /// Loads configuration from `config/default` plus an environment-specific
    /// file, then applies `LEDGERCORE__*` environment variable overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("LEDGERCORE_ENV").unwrap_or_else(|_| DEFAULT_ENV.to_string());

        let settings = Config::builder()
            .add_source(File::with_name(&format!("{}/default", CONFIG_DIR)).required(false))
            .add_source(
                File::with_name(&format!("{}/{}", CONFIG_DIR, environment)).required(false),
            )
            .add_source(Environment::with_prefix("LEDGERCORE").separator("__"))
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        config
            .validate()
            .map_err(|e| ConfigError::Message(e.to_string()))?;
        Ok(config)
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn for_database_fills_defaults() {
        let config = AppConfig::for_database("sqlite::memory:");
        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.sequence_pad_width, 6);
        assert!(!config.is_production());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_database_url_fails_validation() {
        let config = AppConfig::for_database("");
        assert!(config.validate().is_err());
    }
}
