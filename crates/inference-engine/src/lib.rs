//! Inference Engine
//!
//! Scores normalized feature vectors with an exported logistic-regression
//! model and maps probabilities to a user-facing verdict.

mod model;
mod verdict;

pub use model::{sigmoid, Classifier, LogisticModel, PHISHING_CLASS};
pub use verdict::{round2, Assessment, Probabilities, Verdict};

use thiserror::Error;

/// Errors during model loading and inference
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Model load failed: {0}")]
    ModelLoadError(String),
    #[error("Invalid input shape: expected {expected}, got {actual}")]
    InvalidInputShape { expected: usize, actual: usize },
    #[error("Model features do not match the scaling parameters: {0}")]
    FeatureOrderMismatch(String),
    #[error("Inference failed: {0}")]
    InferenceFailed(String),
}
