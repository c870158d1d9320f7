//! Dataset Preprocessing
//!
//! Builds training tables from labeled URL lists using the same extractor
//! the scan service runs.

mod error;
mod pipeline;
mod settings;
mod table;

pub use error::DatasetError;
pub use pipeline::{preprocess, DefaultedRow, PreprocessOptions, PreprocessSummary, ScalerSource};
pub use settings::{PreprocessSettings, DEFAULT_CONFIG_FILE};
pub use table::{read_labeled_urls, write_table, LabeledUrl, LABEL_COLUMN};
