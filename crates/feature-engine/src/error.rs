//! Feature Extraction Error Types

use thiserror::Error;

/// Reasons an extraction falls back to the default row
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FeatureError {
    #[error("Empty URL")]
    EmptyUrl,

    #[error("Extraction panicked: {0}")]
    Panicked(String),

    #[error("Feature {name} has non-finite value {value}")]
    NonFinite { name: &'static str, value: f64 },

    #[error("Feature {name} value {value} outside its domain")]
    OutOfDomain { name: &'static str, value: f64 },

    #[error("Extraction exceeded {0}ms deadline")]
    Deadline(u64),
}
