//! Service Configuration
//!
//! Layers built-in defaults, an optional TOML file and `PHISHGUARD__*`
//! environment variables (e.g. `PHISHGUARD__SERVER__PORT=8080`).

use crate::error::ApiError;
use crate::rate_limit::RateLimitConfig;
use config::{Config, Environment, File};
use feature_engine::ExtractorConfig;
use lookup_client::LookupConfig;
use page_fetcher::FetchConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use storage::HistoryConfig;

/// Default configuration file, loaded when present
pub const DEFAULT_CONFIG_FILE: &str = "config/default.toml";

/// Environment variable prefix
const ENV_PREFIX: &str = "PHISHGUARD";

/// Listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5002,
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Trained artifacts. Without both files the service scores with rules.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelConfig {
    pub model_path: Option<PathBuf>,
    pub scaler_path: Option<PathBuf>,
}

/// Cross-origin settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Allowed origins; `*` allows any
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["http://localhost:3001".to_string()],
        }
    }
}

/// Log output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is unset
    pub level: String,
    /// Emit JSON lines instead of text
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Complete service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub model: ModelConfig,
    pub lookup: LookupConfig,
    pub fetch: FetchConfig,
    pub extractor: ExtractorConfig,
    pub history: HistoryConfig,
    pub cors: CorsConfig,
    pub rate_limit: RateLimitConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load defaults, then `path` (or [`DEFAULT_CONFIG_FILE`] if it exists),
    /// then environment overrides
    pub fn load(path: Option<&str>) -> Result<Self, ApiError> {
        let file = match path {
            Some(path) => File::with_name(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let settings = Config::builder()
            .add_source(Config::try_from(&AppConfig::default())?)
            .add_source(file)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("cors.allowed_origins")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 5002);
        assert_eq!(config.lookup.cache_capacity, 1000);
        assert_eq!(config.fetch.timeout_ms, 5000);
        assert_eq!(config.extractor.batch_concurrency, 100);
        assert!(config.model.model_path.is_none());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[server]\nport = 9000\n\n[cors]\nallowed_origins = [\"https://phishguard.example\"]\n\n[lookup]\nwhois_timeout_ms = 1500"
        )
        .unwrap();

        let path = file.path().to_str().unwrap().to_string();
        let config = AppConfig::load(Some(&path)).unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.cors.allowed_origins, vec!["https://phishguard.example"]);
        assert_eq!(config.lookup.whois_timeout_ms, 1500);
        assert_eq!(config.lookup.dns_timeout_ms, 4000);
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        assert!(AppConfig::load(Some("/nonexistent/phishguard.toml")).is_err());
    }
}
