//! Preprocessing Pipeline
//!
//! Labeled URLs in, raw feature table out, plus optional scaling parameters
//! and a normalized table for training.

use crate::error::DatasetError;
use crate::table::{read_labeled_urls, write_table, LabeledUrl};
use feature_engine::{Extraction, ExtractionOutcome, FeatureExtractor, FeatureName};
use normalizer::{normalize, ScalingParameters};
use std::path::PathBuf;
use tracing::{info, warn};

/// Where scaling parameters come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScalerSource {
    /// Do not scale
    None,
    /// Fit on this dataset and save to the path
    Fit(PathBuf),
    /// Load previously fitted parameters
    Load(PathBuf),
}

#[derive(Debug, Clone)]
pub struct PreprocessOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    pub scaler: ScalerSource,
    /// Requires a scaler source
    pub normalized_output: Option<PathBuf>,
    pub concurrency: usize,
}

/// A row that fell back to defaults
#[derive(Debug, Clone, PartialEq)]
pub struct DefaultedRow {
    pub index: usize,
    pub url: String,
    pub reason: String,
}

/// What a run produced
#[derive(Debug, Clone, Default)]
pub struct PreprocessSummary {
    pub rows: usize,
    pub defaulted: Vec<DefaultedRow>,
    pub normalized_rows: Option<usize>,
}

impl PreprocessSummary {
    pub fn defaulted_share(&self) -> f64 {
        if self.rows == 0 {
            0.0
        } else {
            self.defaulted.len() as f64 / self.rows as f64
        }
    }
}

/// Run the full preprocessing pipeline
pub async fn preprocess(
    extractor: &FeatureExtractor,
    options: &PreprocessOptions,
) -> Result<PreprocessSummary, DatasetError> {
    if options.normalized_output.is_some() && options.scaler == ScalerSource::None {
        return Err(DatasetError::InvalidOptions(
            "normalized output needs --fit-scaler or --scaler".to_string(),
        ));
    }

    // Load before extracting so a bad parameter file fails fast
    let loaded = match &options.scaler {
        ScalerSource::Load(path) => Some(ScalingParameters::load(path)?),
        _ => None,
    };

    let input = read_labeled_urls(&options.input)?;
    if input.is_empty() {
        return Err(DatasetError::EmptyInput);
    }

    let urls: Vec<&str> = input.iter().map(|row| row.url.as_str()).collect();
    let extractions = extractor.extract_batch(&urls, options.concurrency).await;
    let defaulted = collect_defaulted(&input, &extractions);

    let columns: Vec<&str> = FeatureName::ALL.iter().map(|f| f.as_str()).collect();
    let rows = write_table(
        &options.output,
        &columns,
        labeled_rows(&input, &extractions, |e| Ok(e.vector.values()))?,
    )?;

    let parameters = match (&options.scaler, loaded) {
        (ScalerSource::Fit(path), _) => {
            let vectors: Vec<_> = extractions.iter().map(|e| e.vector.clone()).collect();
            let fitted = ScalingParameters::fit(&vectors)?;
            fitted.save(path)?;
            info!("Saved scaling parameters to {}", path.display());
            Some(fitted)
        }
        (_, loaded) => loaded,
    };

    let normalized_rows = match (&options.normalized_output, &parameters) {
        (Some(path), Some(parameters)) => {
            let normalized = labeled_rows(&input, &extractions, |e| {
                normalize(&e.vector, parameters).map_err(DatasetError::from)
            })?;
            Some(write_table(path, &parameters.names(), normalized)?)
        }
        _ => None,
    };

    Ok(PreprocessSummary {
        rows,
        defaulted,
        normalized_rows,
    })
}

fn labeled_rows<'a, F>(
    input: &'a [LabeledUrl],
    extractions: &[Extraction],
    mut values: F,
) -> Result<Vec<(Vec<f64>, &'a str)>, DatasetError>
where
    F: FnMut(&Extraction) -> Result<Vec<f64>, DatasetError>,
{
    input
        .iter()
        .zip(extractions)
        .map(|(row, extraction)| Ok((values(extraction)?, row.label.as_str())))
        .collect()
}

fn collect_defaulted(input: &[LabeledUrl], extractions: &[Extraction]) -> Vec<DefaultedRow> {
    let defaulted: Vec<DefaultedRow> = input
        .iter()
        .zip(extractions)
        .enumerate()
        .filter_map(|(index, (row, extraction))| match &extraction.outcome {
            ExtractionOutcome::Complete => None,
            ExtractionOutcome::Defaulted { reason } => Some(DefaultedRow {
                index,
                url: row.url.clone(),
                reason: reason.to_string(),
            }),
        })
        .collect();

    if !defaulted.is_empty() {
        warn!(
            "{} of {} rows fell back to default features",
            defaulted.len(),
            input.len()
        );
    }
    defaulted
}
