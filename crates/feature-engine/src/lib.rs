//! Feature Engineering Engine
//!
//! Turns a URL into the fixed, ordered feature vector shared by training and
//! inference. Page fetch and domain lookups run concurrently; any failure in
//! one URL's extraction yields the default row instead of an error.

mod address;
mod error;
mod features;
mod schema;
mod signals;
mod statistics;

pub use address::{validate_url, DomainParts, DomainSplitter, ParsedUrl};
pub use error::FeatureError;
pub use features::{
    ExtractorConfig, Extraction, ExtractionOutcome, FeatureExtractor, FeatureVector,
};
pub use schema::{FeatureName, ValueDomain, FEATURE_DIMENSION};
pub use signals::{evaluate, SignalContext};
pub use statistics::{shannon_entropy, DomainStatistics};
