//! URL Scanner
//!
//! Extraction followed by model scoring, or rule scoring when no trained
//! model is deployed.

use crate::config::AppConfig;
use crate::error::ApiError;
use fallback::RuleScorer;
use feature_engine::FeatureExtractor;
use inference_engine::{Assessment, Classifier, LogisticModel};
use lookup_client::{LookupCache, LookupClient};
use normalizer::{normalize, ScalingParameters};
use page_fetcher::PageFetcher;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// How extracted features are turned into a verdict
pub enum Scoring {
    /// Trained classifier over normalized features
    Model {
        classifier: Box<dyn Classifier>,
        parameters: ScalingParameters,
    },
    /// Share-of-safe-signals rules over raw features
    Rules(RuleScorer),
}

impl Scoring {
    /// Load the model and scaler when both are configured
    pub fn from_config(config: &AppConfig) -> Result<Self, ApiError> {
        match (&config.model.model_path, &config.model.scaler_path) {
            (Some(model_path), Some(scaler_path)) => {
                let model = LogisticModel::load(model_path)?;
                let parameters = ScalingParameters::load(scaler_path)
                    .map_err(|e| ApiError::Startup(format!("scaling parameters: {}", e)))?;
                model.check_feature_order(&parameters.names())?;

                info!("Scoring with logistic model ({} features)", parameters.len());
                Ok(Scoring::Model {
                    classifier: Box::new(model),
                    parameters,
                })
            }
            (None, None) => {
                warn!("No model configured; scoring with rules");
                Ok(Scoring::Rules(RuleScorer::default()))
            }
            _ => Err(ApiError::Startup(
                "model_path and scaler_path must be configured together".to_string(),
            )),
        }
    }

    pub fn mode(&self) -> &'static str {
        match self {
            Scoring::Model { .. } => "model",
            Scoring::Rules(_) => "rules",
        }
    }
}

/// Result of one scan
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub assessment: Assessment,
    pub used_fallback: bool,
    /// The default feature row was scored
    pub defaulted: bool,
}

/// Extraction plus scoring
pub struct Scanner {
    extractor: FeatureExtractor,
    scoring: Scoring,
    lookups: Option<Arc<LookupClient>>,
}

impl Scanner {
    /// Build live network sources and scoring from configuration
    pub fn from_config(config: &AppConfig) -> Result<Self, ApiError> {
        let lookups = Arc::new(LookupClient::new(&config.lookup));
        let pages = Arc::new(
            PageFetcher::new(&config.fetch)
                .map_err(|e| ApiError::Startup(format!("page fetcher: {}", e)))?,
        );
        let extractor = FeatureExtractor::new(lookups.clone(), pages, config.extractor.clone());

        Ok(Self {
            extractor,
            scoring: Scoring::from_config(config)?,
            lookups: Some(lookups),
        })
    }

    /// Scanner over explicit parts
    pub fn new(extractor: FeatureExtractor, scoring: Scoring) -> Self {
        Self {
            extractor,
            scoring,
            lookups: None,
        }
    }

    pub fn mode(&self) -> &'static str {
        self.scoring.mode()
    }

    /// Lookup memo, when backed by a live client
    pub fn lookup_cache(&self) -> Option<&LookupCache> {
        self.lookups.as_deref().map(LookupClient::cache)
    }

    /// Extract and score one URL
    pub async fn scan(&self, url: &str) -> Result<ScanOutcome, ApiError> {
        let extraction = self.extractor.extract_detailed(url).await;
        let defaulted = extraction.is_defaulted();

        let (assessment, used_fallback) = match &self.scoring {
            Scoring::Model {
                classifier,
                parameters,
            } => {
                let x = normalize(&extraction.vector, parameters).map_err(|e| {
                    error!("Cannot normalize features for {}: {}", url, e);
                    ApiError::SchemaMismatch(e.to_string())
                })?;
                let [p_legit, p_phish] = classifier.predict_proba(&x)?;
                (Assessment::from_probabilities(p_legit, p_phish), false)
            }
            Scoring::Rules(scorer) => (scorer.assess(&extraction.vector), true),
        };

        debug!(
            "Scanned {}: {:?} ({:.2})",
            url, assessment.result, assessment.safety_score
        );
        Ok(ScanOutcome {
            assessment,
            used_fallback,
            defaulted,
        })
    }
}
