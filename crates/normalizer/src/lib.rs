//! Feature Normalization
//!
//! Standardizes feature vectors with per-feature mean and standard deviation
//! fitted once at training time and persisted as JSON.

mod error;
mod normalizer;
mod parameters;

pub use error::NormalizeError;
pub use normalizer::{check_schema, normalize};
pub use parameters::{FeatureScale, ScalingParameters};
