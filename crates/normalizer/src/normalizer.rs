//! Strict-Schema Standardization

use crate::error::NormalizeError;
use crate::parameters::ScalingParameters;
use feature_engine::FeatureVector;
use std::collections::HashSet;
use tracing::debug;

/// Fail unless the vector carries exactly the parameters' feature names,
/// each once
pub fn check_schema(
    vector: &FeatureVector,
    params: &ScalingParameters,
) -> Result<(), NormalizeError> {
    let expected: HashSet<&str> = params.features.iter().map(|f| f.name.as_str()).collect();

    let mut actual: HashSet<&str> = HashSet::new();
    let mut duplicated: Vec<String> = vector
        .names()
        .filter(|name| !actual.insert(*name))
        .map(str::to_string)
        .collect();

    if duplicated.is_empty() && expected == actual && vector.len() == params.len() {
        return Ok(());
    }

    let mut missing: Vec<String> = expected
        .difference(&actual)
        .map(|s| s.to_string())
        .collect();
    let mut unexpected: Vec<String> = actual
        .difference(&expected)
        .map(|s| s.to_string())
        .collect();
    missing.sort();
    unexpected.sort();
    duplicated.sort();
    duplicated.dedup();

    Err(NormalizeError::SchemaMismatch {
        missing,
        unexpected,
        duplicated,
    })
}

/// `(value - mean) / std` in the parameters' order. NaN and infinities map to 0.
pub fn normalize(
    vector: &FeatureVector,
    params: &ScalingParameters,
) -> Result<Vec<f64>, NormalizeError> {
    check_schema(vector, params)?;

    let normalized: Vec<f64> = params
        .features
        .iter()
        .map(|scale| {
            let value = vector.get(&scale.name).unwrap_or(0.0);
            let z = (value - scale.mean) / scale.std;
            if z.is_finite() {
                z
            } else {
                0.0
            }
        })
        .collect();

    debug!("Normalized {} features", normalized.len());
    Ok(normalized)
}
