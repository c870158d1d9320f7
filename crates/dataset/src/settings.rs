//! Preprocessing Settings
//!
//! Same layering as the scan service: built-in defaults, an optional TOML
//! file, then `PHISHGUARD__*` environment variables. Sections the service
//! alone uses (server, cors, ...) are ignored.

use crate::error::DatasetError;
use config::{Config, Environment, File};
use feature_engine::ExtractorConfig;
use lookup_client::LookupConfig;
use page_fetcher::FetchConfig;
use serde::{Deserialize, Serialize};

/// Configuration file shared with the scan service, loaded when present
pub const DEFAULT_CONFIG_FILE: &str = "config/default.toml";

const ENV_PREFIX: &str = "PHISHGUARD";

/// Network and extraction settings for a preprocessing run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PreprocessSettings {
    pub lookup: LookupConfig,
    pub fetch: FetchConfig,
    pub extractor: ExtractorConfig,
}

impl PreprocessSettings {
    /// Load defaults, then `path` (or [`DEFAULT_CONFIG_FILE`] if it exists),
    /// then environment overrides
    pub fn load(path: Option<&str>) -> Result<Self, DatasetError> {
        let file = match path {
            Some(path) => File::with_name(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let settings = Config::builder()
            .add_source(Config::try_from(&PreprocessSettings::default())?)
            .add_source(file)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
