//! Scaling Parameters

use crate::error::NormalizeError;
use crate::normalizer::check_schema;
use feature_engine::FeatureVector;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Mean and standard deviation of one feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureScale {
    pub name: String,
    pub mean: f64,
    /// Never 0 after fitting
    pub std: f64,
}

/// Ordered per-feature scaling, fitted once from training data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalingParameters {
    pub features: Vec<FeatureScale>,
}

impl ScalingParameters {
    /// Fit on training rows. Uses the sample standard deviation (n - 1);
    /// a zero or non-finite std is stored as 1.
    pub fn fit(rows: &[FeatureVector]) -> Result<Self, NormalizeError> {
        let first = rows.first().ok_or(NormalizeError::EmptyTrainingSet)?;
        let names: Vec<String> = first.names().map(str::to_string).collect();
        let reference = Self::identity(&names);

        for row in rows {
            check_schema(row, &reference)?;
        }

        let n = rows.len() as f64;
        let features = names
            .iter()
            .map(|name| {
                let column: Vec<f64> = rows
                    .iter()
                    .map(|row| row.get(name).unwrap_or(0.0))
                    .collect();

                let mean = column.iter().sum::<f64>() / n;
                let m2: f64 = column.iter().map(|v| (v - mean) * (v - mean)).sum();
                let std = (m2 / (n - 1.0)).sqrt();

                let std = if std.is_finite() && std > 0.0 {
                    std
                } else {
                    1.0
                };

                FeatureScale {
                    name: name.clone(),
                    mean: if mean.is_finite() { mean } else { 0.0 },
                    std,
                }
            })
            .collect();

        let params = Self { features };
        params.validate()?;
        info!("Fitted scaling parameters on {} rows", rows.len());
        Ok(params)
    }

    /// Mean 0 and std 1 for every name
    pub fn identity(names: &[String]) -> Self {
        Self {
            features: names
                .iter()
                .map(|name| FeatureScale {
                    name: name.clone(),
                    mean: 0.0,
                    std: 1.0,
                })
                .collect(),
        }
    }

    /// Feature names in order
    pub fn names(&self) -> Vec<&str> {
        self.features.iter().map(|f| f.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Reject empty or duplicate feature lists
    pub fn validate(&self) -> Result<(), NormalizeError> {
        if self.features.is_empty() {
            return Err(NormalizeError::InvalidParameters(
                "no features".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for feature in &self.features {
            if !seen.insert(feature.name.as_str()) {
                return Err(NormalizeError::InvalidParameters(format!(
                    "duplicate feature '{}'",
                    feature.name
                )));
            }
            if feature.std == 0.0 {
                warn!("Feature '{}' has zero std; values will map to 0", feature.name);
            }
        }
        Ok(())
    }

    /// Persist as JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), NormalizeError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        info!("Saved scaling parameters to {}", path.display());
        Ok(())
    }

    /// Load persisted parameters unchanged
    pub fn load(path: impl AsRef<Path>) -> Result<Self, NormalizeError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let params: Self = serde_json::from_str(&json)?;
        params.validate()?;
        info!(
            "Loaded scaling parameters for {} features from {}",
            params.len(),
            path.display()
        );
        Ok(params)
    }
}
