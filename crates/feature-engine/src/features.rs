//! Feature Vector Assembly

use crate::address::{validate_url, DomainSplitter, ParsedUrl};
use crate::error::FeatureError;
use crate::schema::{FeatureName, FEATURE_DIMENSION};
use crate::signals::{evaluate, SignalContext};
use chrono::{NaiveDate, Utc};
use futures::stream::{self, StreamExt};
use futures::FutureExt;
use lookup_client::DomainLookup;
use page_fetcher::PageSource;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Ordered mapping from feature name to value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    entries: Vec<(String, f64)>,
}

impl FeatureVector {
    /// The default row: every feature at its failure default
    pub fn defaults() -> Self {
        Self {
            entries: FeatureName::ALL
                .iter()
                .map(|f| (f.as_str().to_string(), f.default_value()))
                .collect(),
        }
    }

    /// Evaluate every signal in schema order
    pub fn assemble(ctx: &SignalContext<'_>) -> Self {
        Self {
            entries: FeatureName::ALL
                .iter()
                .map(|&f| (f.as_str().to_string(), evaluate(f, ctx)))
                .collect(),
        }
    }

    /// Build from explicit entries (e.g. a row read back from a table)
    pub fn from_entries(entries: Vec<(String, f64)>) -> Self {
        Self { entries }
    }

    /// Value of a feature by name
    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }

    /// Value of a schema feature
    pub fn value(&self, feature: FeatureName) -> Option<f64> {
        self.get(feature.as_str())
    }

    /// Names in order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    /// Values in order
    pub fn values(&self) -> Vec<f64> {
        self.entries.iter().map(|(_, v)| *v).collect()
    }

    /// Entries in order
    pub fn entries(&self) -> &[(String, f64)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check every value is finite and inside its declared domain
    pub fn validate(&self) -> Result<(), FeatureError> {
        for feature in FeatureName::ALL {
            let value = self.value(feature).unwrap_or(f64::NAN);
            if !value.is_finite() {
                return Err(FeatureError::NonFinite {
                    name: feature.as_str(),
                    value,
                });
            }
            if !feature.domain().contains(value) {
                return Err(FeatureError::OutOfDomain {
                    name: feature.as_str(),
                    value,
                });
            }
        }
        Ok(())
    }
}

/// Assembler configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Deadline for one URL's whole extraction (ms)
    pub deadline_ms: u64,
    /// Extractions in flight during a batch
    pub batch_concurrency: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            deadline_ms: 15_000,
            batch_concurrency: 100,
        }
    }
}

/// How a row was produced
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionOutcome {
    Complete,
    /// The default row was substituted
    Defaulted { reason: FeatureError },
}

/// A row plus how it was produced
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub vector: FeatureVector,
    pub outcome: ExtractionOutcome,
}

impl Extraction {
    pub fn is_defaulted(&self) -> bool {
        matches!(self.outcome, ExtractionOutcome::Defaulted { .. })
    }
}

/// Turns URLs into feature vectors
pub struct FeatureExtractor {
    lookups: Arc<dyn DomainLookup>,
    pages: Arc<dyn PageSource>,
    splitter: DomainSplitter,
    config: ExtractorConfig,
}

impl FeatureExtractor {
    /// Create a new extractor over the given sources
    pub fn new(
        lookups: Arc<dyn DomainLookup>,
        pages: Arc<dyn PageSource>,
        config: ExtractorConfig,
    ) -> Self {
        info!(
            "Creating feature extractor: {} features, deadline={}ms, concurrency={}",
            FEATURE_DIMENSION, config.deadline_ms, config.batch_concurrency
        );
        Self {
            lookups,
            pages,
            splitter: DomainSplitter::new(),
            config,
        }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extract one URL. Always returns a complete vector.
    pub async fn extract(&self, url: &str) -> FeatureVector {
        self.extract_detailed(url).await.vector
    }

    /// Extract one URL and report whether the default row was used.
    ///
    /// A panic anywhere in the extraction (parsing, either source, signal
    /// assembly) yields the default row like any other failure.
    pub async fn extract_detailed(&self, url: &str) -> Extraction {
        let deadline = Duration::from_millis(self.config.deadline_ms);
        let guarded = AssertUnwindSafe(self.try_extract(url)).catch_unwind();
        let result = match timeout(deadline, guarded).await {
            Ok(Ok(result)) => result,
            Ok(Err(payload)) => Err(FeatureError::Panicked(panic_message(payload))),
            Err(_) => Err(FeatureError::Deadline(self.config.deadline_ms)),
        };

        match result {
            Ok(vector) => Extraction {
                vector,
                outcome: ExtractionOutcome::Complete,
            },
            Err(reason) => {
                warn!("Using default row for URL '{}': {}", url, reason);
                Extraction {
                    vector: FeatureVector::defaults(),
                    outcome: ExtractionOutcome::Defaulted { reason },
                }
            }
        }
    }

    /// Extract many URLs with bounded concurrency; output order equals input order
    pub async fn extract_batch<S: AsRef<str>>(
        &self,
        urls: &[S],
        concurrency: usize,
    ) -> Vec<Extraction> {
        info!(
            "Extracting batch of {} URLs ({} in flight)",
            urls.len(),
            concurrency.max(1)
        );
        stream::iter(urls)
            .map(|url| self.extract_detailed(url.as_ref()))
            .buffered(concurrency.max(1))
            .collect()
            .await
    }

    async fn try_extract(&self, url: &str) -> Result<FeatureVector, FeatureError> {
        let raw = validate_url(url)?;
        let parsed = ParsedUrl::parse(raw);
        let parts = self.splitter.split(&parsed);
        let registrable = parts.registrable();

        let (page, lookup) = tokio::join!(
            self.pages.fetch(&parsed.fetch_url),
            self.lookups.lookup(&registrable)
        );
        debug!(
            "Sources for {}: page={}, dns={}, whois={}",
            raw,
            page.is_some(),
            lookup.dns_present,
            lookup.whois.is_some()
        );

        let ctx = SignalContext {
            raw,
            url: &parsed,
            parts: &parts,
            lookup: &lookup,
            page: page.as_ref(),
            today: today(),
        };

        let vector = FeatureVector::assemble(&ctx);
        vector.validate()?;
        Ok(vector)
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}
