//! Dataset Error Types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Normalize(#[from] normalizer::NormalizeError),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Input contains no rows")]
    EmptyInput,

    #[error("Invalid options: {0}")]
    InvalidOptions(String),
}

impl DatasetError {
    pub fn is_schema_mismatch(&self) -> bool {
        matches!(self, DatasetError::Normalize(e) if e.is_schema_mismatch())
    }
}
