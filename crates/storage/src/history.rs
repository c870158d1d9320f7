//! Scan History

use crate::StorageError;
use chrono::Utc;
use inference_engine::Verdict;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

/// One completed scan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRecord {
    /// Assigned on insert
    pub id: u64,
    pub url: String,
    pub result: Verdict,
    pub safety_score: f64,
    pub used_fallback: bool,
    pub timestamp_ms: i64,
}

impl ScanRecord {
    /// A record stamped with the current time; the id is assigned on insert
    pub fn new(url: &str, result: Verdict, safety_score: f64, used_fallback: bool) -> Self {
        Self {
            id: 0,
            url: url.to_string(),
            result,
            safety_score,
            used_fallback,
            timestamp_ms: Utc::now().timestamp_millis(),
        }
    }
}

/// History configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Records kept before the oldest is dropped
    pub max_records: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_records: 10_000,
        }
    }
}

/// Counts per verdict
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistorySummary {
    pub safe: usize,
    pub moderate: usize,
    pub dangerous: usize,
}

struct Inner {
    records: VecDeque<ScanRecord>,
    next_id: u64,
}

/// Bounded in-memory scan log
pub struct ScanHistory {
    inner: Mutex<Inner>,
    max_records: usize,
}

impl ScanHistory {
    /// Create a new history
    pub fn new(config: &HistoryConfig) -> Self {
        info!("Creating scan history: max_records={}", config.max_records);
        Self {
            inner: Mutex::new(Inner {
                records: VecDeque::with_capacity(config.max_records.min(1024)),
                next_id: 1,
            }),
            max_records: config.max_records.max(1),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, StorageError> {
        self.inner
            .lock()
            .map_err(|e| StorageError::LockPoisoned(e.to_string()))
    }

    /// Insert a record, assigning its id. Drops the oldest when full.
    pub fn insert(&self, mut record: ScanRecord) -> Result<u64, StorageError> {
        let mut inner = self.lock()?;

        record.id = inner.next_id;
        inner.next_id += 1;

        while inner.records.len() >= self.max_records {
            inner.records.pop_front();
        }

        let id = record.id;
        inner.records.push_back(record);
        debug!("Recorded scan {}", id);
        Ok(id)
    }

    /// Most recent first, optionally filtered by verdict
    pub fn recent(
        &self,
        result: Option<Verdict>,
        limit: usize,
    ) -> Result<Vec<ScanRecord>, StorageError> {
        let inner = self.lock()?;
        Ok(inner
            .records
            .iter()
            .rev()
            .filter(|r| result.map_or(true, |v| r.result == v))
            .take(limit)
            .cloned()
            .collect())
    }

    /// Counts per verdict over retained records
    pub fn summary(&self) -> Result<HistorySummary, StorageError> {
        let inner = self.lock()?;
        let mut summary = HistorySummary::default();
        for record in &inner.records {
            match record.result {
                Verdict::Safe => summary.safe += 1,
                Verdict::Moderate => summary.moderate += 1,
                Verdict::Dangerous => summary.dangerous += 1,
            }
        }
        Ok(summary)
    }

    /// Retained record count
    pub fn count(&self) -> usize {
        self.inner.lock().map(|i| i.records.len()).unwrap_or(0)
    }

    /// Drop every record; ids keep increasing
    pub fn clear(&self) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.records.clear();
        }
    }
}

impl Default for ScanHistory {
    fn default() -> Self {
        Self::new(&HistoryConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_recent() {
        let history = ScanHistory::default();
        let first = history
            .insert(ScanRecord::new("http://a.com", Verdict::Safe, 91.2, false))
            .unwrap();
        let second = history
            .insert(ScanRecord::new("http://b.tk", Verdict::Dangerous, 12.0, true))
            .unwrap();

        assert_eq!((first, second), (1, 2));

        let recent = history.recent(None, 10).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].url, "http://b.tk");
        assert!(recent[0].used_fallback);
    }

    #[test]
    fn test_filter_by_verdict() {
        let history = ScanHistory::default();
        for (url, verdict) in [
            ("http://a.com", Verdict::Safe),
            ("http://b.com", Verdict::Moderate),
            ("http://c.com", Verdict::Safe),
        ] {
            history.insert(ScanRecord::new(url, verdict, 70.0, false)).unwrap();
        }

        let safe = history.recent(Some(Verdict::Safe), 10).unwrap();
        assert_eq!(safe.len(), 2);
        assert_eq!(safe[0].url, "http://c.com");

        assert_eq!(history.recent(None, 1).unwrap().len(), 1);
        assert_eq!(
            history.summary().unwrap(),
            HistorySummary {
                safe: 2,
                moderate: 1,
                dangerous: 0
            }
        );
    }

    #[test]
    fn test_retention_limit() {
        let history = ScanHistory::new(&HistoryConfig { max_records: 5 });
        for i in 0..10 {
            history
                .insert(ScanRecord::new(&format!("http://{}.com", i), Verdict::Safe, 90.0, false))
                .unwrap();
        }

        assert_eq!(history.count(), 5);
        let oldest = history.recent(None, 5).unwrap().pop().unwrap();
        assert_eq!(oldest.id, 6);
    }

    #[test]
    fn test_clear_keeps_ids_increasing() {
        let history = ScanHistory::default();
        history.insert(ScanRecord::new("http://a.com", Verdict::Safe, 90.0, false)).unwrap();
        history.clear();
        assert_eq!(history.count(), 0);

        let id = history
            .insert(ScanRecord::new("http://a.com", Verdict::Safe, 90.0, false))
            .unwrap();
        assert_eq!(id, 2);
    }

    #[test]
    fn test_record_json_shape() {
        let record = ScanRecord::new("http://a.com", Verdict::Moderate, 65.5, true);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["result"], "Moderate");
        assert_eq!(json["safetyScore"], 65.5);
        assert_eq!(json["usedFallback"], true);
    }
}
