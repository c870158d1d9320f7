//! Logistic Regression Model

use crate::InferenceError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Class index of phishing predictions
pub const PHISHING_CLASS: u8 = 1;

/// A binary classifier over normalized feature vectors
pub trait Classifier: Send + Sync {
    /// `[p_legitimate, p_phishing]`
    fn predict_proba(&self, x: &[f64]) -> Result<[f64; 2], InferenceError>;

    /// 1 for phishing, 0 for legitimate
    fn predict(&self, x: &[f64]) -> Result<u8, InferenceError> {
        let [_, p_phish] = self.predict_proba(x)?;
        Ok(if p_phish >= 0.5 { PHISHING_CLASS } else { 0 })
    }
}

/// Numerically stable logistic function
pub fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// Coefficients exported from the trainer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    /// Feature order the coefficients were trained on
    pub feature_names: Vec<String>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl LogisticModel {
    /// Parse and validate a model from JSON
    pub fn from_json(json: &str) -> Result<Self, InferenceError> {
        let model: Self = serde_json::from_str(json)
            .map_err(|e| InferenceError::ModelLoadError(e.to_string()))?;
        model.validate()?;
        Ok(model)
    }

    /// Load a model file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, InferenceError> {
        let path = path.as_ref();
        info!("Loading logistic model from {}", path.display());

        let json = fs::read_to_string(path)
            .map_err(|e| InferenceError::ModelLoadError(format!("{}: {}", path.display(), e)))?;
        let model = Self::from_json(&json)?;

        info!("Model loaded: {} coefficients", model.coefficients.len());
        Ok(model)
    }

    fn validate(&self) -> Result<(), InferenceError> {
        if self.coefficients.is_empty() {
            return Err(InferenceError::ModelLoadError("no coefficients".to_string()));
        }
        if self.coefficients.len() != self.feature_names.len() {
            return Err(InferenceError::ModelLoadError(format!(
                "{} coefficients for {} features",
                self.coefficients.len(),
                self.feature_names.len()
            )));
        }
        if !self.intercept.is_finite() || self.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(InferenceError::ModelLoadError(
                "non-finite coefficient".to_string(),
            ));
        }
        Ok(())
    }

    /// Require the model's feature order to equal `names`
    pub fn check_feature_order(&self, names: &[&str]) -> Result<(), InferenceError> {
        if self.feature_names.iter().map(String::as_str).eq(names.iter().copied()) {
            return Ok(());
        }

        let first_difference = self
            .feature_names
            .iter()
            .map(String::as_str)
            .zip(names.iter().copied())
            .position(|(a, b)| a != b)
            .unwrap_or_else(|| self.feature_names.len().min(names.len()));

        Err(InferenceError::FeatureOrderMismatch(format!(
            "model has {} features, parameters have {}; first difference at position {}",
            self.feature_names.len(),
            names.len(),
            first_difference
        )))
    }

    /// Linear score `w·x + b`
    pub fn decision_function(&self, x: &[f64]) -> Result<f64, InferenceError> {
        if x.len() != self.coefficients.len() {
            return Err(InferenceError::InvalidInputShape {
                expected: self.coefficients.len(),
                actual: x.len(),
            });
        }
        let dot: f64 = self
            .coefficients
            .iter()
            .zip(x)
            .map(|(w, v)| w * v)
            .sum();
        Ok(dot + self.intercept)
    }
}

impl Classifier for LogisticModel {
    fn predict_proba(&self, x: &[f64]) -> Result<[f64; 2], InferenceError> {
        let z = self.decision_function(x)?;
        let p_phish = sigmoid(z);
        debug!("Logistic score z={:.4}, p_phish={:.4}", z, p_phish);
        Ok([1.0 - p_phish, p_phish])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn model() -> LogisticModel {
        LogisticModel {
            feature_names: vec!["a".into(), "b".into()],
            coefficients: vec![2.0, -1.0],
            intercept: 0.5,
        }
    }

    #[test]
    fn test_predict_proba() {
        let m = model();
        let [legit, phish] = m.predict_proba(&[0.0, 0.5]).unwrap();
        assert!((phish - 0.5).abs() < 1e-12);
        assert!((legit + phish - 1.0).abs() < 1e-12);

        assert_eq!(m.predict(&[3.0, 0.0]).unwrap(), PHISHING_CLASS);
        assert_eq!(m.predict(&[-3.0, 0.0]).unwrap(), 0);
    }

    #[test]
    fn test_wrong_input_length() {
        let err = model().predict_proba(&[1.0]).unwrap_err();
        assert!(matches!(
            err,
            InferenceError::InvalidInputShape {
                expected: 2,
                actual: 1
            }
        ));
    }

    #[test]
    fn test_from_json_validates() {
        let ok = r#"{"feature_names":["a"],"coefficients":[1.5],"intercept":-0.2}"#;
        assert_eq!(LogisticModel::from_json(ok).unwrap().coefficients, vec![1.5]);

        let ragged = r#"{"feature_names":["a","b"],"coefficients":[1.5],"intercept":0.0}"#;
        assert!(matches!(
            LogisticModel::from_json(ragged),
            Err(InferenceError::ModelLoadError(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(&path, serde_json::to_string(&model()).unwrap()).unwrap();

        assert_eq!(LogisticModel::load(&path).unwrap(), model());
        assert!(LogisticModel::load(dir.path().join("missing.json")).is_err());
    }

    #[test]
    fn test_feature_order_check() {
        let m = model();
        assert!(m.check_feature_order(&["a", "b"]).is_ok());
        assert!(matches!(
            m.check_feature_order(&["b", "a"]),
            Err(InferenceError::FeatureOrderMismatch(_))
        ));
        assert!(m.check_feature_order(&["a"]).is_err());
    }

    proptest! {
        #[test]
        fn prop_sigmoid_is_probability(z in -1e6f64..1e6) {
            let p = sigmoid(z);
            prop_assert!((0.0..=1.0).contains(&p));
            prop_assert!((sigmoid(-z) - (1.0 - p)).abs() < 1e-9);
        }
    }
}
