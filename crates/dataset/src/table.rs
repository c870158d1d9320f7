//! Labeled URL input and feature table output

use crate::error::DatasetError;
use serde::Deserialize;
use std::path::Path;
use tracing::info;

/// Name of the label column in every table
pub const LABEL_COLUMN: &str = "label";

/// One input row
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LabeledUrl {
    #[serde(default)]
    pub url: String,
    pub label: String,
}

/// Read a `url,label` CSV with a header row. Extra columns are ignored.
pub fn read_labeled_urls(path: impl AsRef<Path>) -> Result<Vec<LabeledUrl>, DatasetError> {
    let path = path.as_ref();
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_path(path)?;

    let rows = reader
        .deserialize()
        .collect::<Result<Vec<LabeledUrl>, _>>()?;
    info!("Read {} labeled URLs from {}", rows.len(), path.display());
    Ok(rows)
}

/// Write `columns + label`, one record per row
pub fn write_table<'a>(
    path: impl AsRef<Path>,
    columns: &[&str],
    rows: impl IntoIterator<Item = (Vec<f64>, &'a str)>,
) -> Result<usize, DatasetError> {
    let path = path.as_ref();
    let mut writer = csv::Writer::from_path(path)?;

    writer.write_record(columns.iter().copied().chain(std::iter::once(LABEL_COLUMN)))?;

    let mut written = 0;
    for (values, label) in rows {
        let mut record: Vec<String> = values.iter().map(|v| v.to_string()).collect();
        record.push(label.to_string());
        writer.write_record(&record)?;
        written += 1;
    }
    writer.flush()?;

    info!("Wrote {} rows to {}", written, path.display());
    Ok(written)
}
