//! Storage Layer
//!
//! Keeps recent scan results in memory with a retention limit.

mod history;

pub use history::{HistoryConfig, HistorySummary, ScanHistory, ScanRecord};

use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("History lock poisoned: {0}")]
    LockPoisoned(String),
}
