//! Normalization Error Types

use thiserror::Error;

/// Errors while fitting, loading or applying scaling parameters
#[derive(Debug, Error)]
pub enum NormalizeError {
    /// Vector names differ from the parameter names
    #[error(
        "Feature schema mismatch: missing {missing:?}, unexpected {unexpected:?}, duplicated {duplicated:?}"
    )]
    SchemaMismatch {
        missing: Vec<String>,
        unexpected: Vec<String>,
        duplicated: Vec<String>,
    },

    /// No rows to fit on
    #[error("Cannot fit scaling parameters on an empty training set")]
    EmptyTrainingSet,

    /// Parameters that cannot be used
    #[error("Invalid scaling parameters: {0}")]
    InvalidParameters(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl NormalizeError {
    /// Whether this error means training and serving disagree on the schema
    pub fn is_schema_mismatch(&self) -> bool {
        matches!(self, NormalizeError::SchemaMismatch { .. })
    }
}
