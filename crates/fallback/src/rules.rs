//! Tri-State Rule Scorer

use feature_engine::{FeatureName, FeatureVector};
use inference_engine::{round2, Assessment};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Scorer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Weight of a neutral (0) signal relative to a safe (+1) one
    pub neutral_weight: f64,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            neutral_weight: 0.5,
        }
    }
}

/// Breakdown of a rule-based score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleScore {
    /// 0-100, rounded to 2 decimals
    pub safety_score: f64,
    pub safe: usize,
    pub neutral: usize,
    pub suspicious: usize,
    /// Signals that voted suspicious, in schema order
    pub flagged: Vec<FeatureName>,
}

/// Share-of-safe-signals scorer over the tri-state features
pub struct RuleScorer {
    config: RuleConfig,
}

impl RuleScorer {
    /// Create a new scorer
    pub fn new(config: RuleConfig) -> Self {
        info!(
            "Creating rule scorer: neutral_weight={}",
            config.neutral_weight
        );
        Self { config }
    }

    /// Score a raw (not normalized) vector. Missing signals count as neutral.
    pub fn score(&self, vector: &FeatureVector) -> RuleScore {
        let mut safe = 0;
        let mut neutral = 0;
        let mut flagged = Vec::new();

        for feature in FeatureName::ALL.iter().filter(|f| f.is_tristate()) {
            match vector.value(*feature) {
                Some(v) if v > 0.0 => safe += 1,
                Some(v) if v < 0.0 => flagged.push(*feature),
                _ => neutral += 1,
            }
        }

        let total = safe + neutral + flagged.len();
        let points = safe as f64 + self.config.neutral_weight * neutral as f64;
        let safety_score = if total == 0 {
            0.0
        } else {
            round2(100.0 * points / total as f64)
        };

        debug!(
            "Rule score {:.2}: safe={}, neutral={}, suspicious={}",
            safety_score,
            safe,
            neutral,
            flagged.len()
        );

        RuleScore {
            safety_score,
            safe,
            neutral,
            suspicious: flagged.len(),
            flagged,
        }
    }

    /// Score and map to a verdict
    pub fn assess(&self, vector: &FeatureVector) -> Assessment {
        Assessment::from_safety_score(self.score(vector).safety_score)
    }
}

impl Default for RuleScorer {
    fn default() -> Self {
        Self::new(RuleConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inference_engine::Verdict;
    use proptest::prelude::*;

    fn vector_with(tristate: f64) -> FeatureVector {
        FeatureVector::from_entries(
            FeatureName::ALL
                .iter()
                .map(|f| {
                    let v = if f.is_tristate() { tristate } else { 12.0 };
                    (f.as_str().to_string(), v)
                })
                .collect(),
        )
    }

    #[test]
    fn test_all_safe() {
        let score = RuleScorer::default().score(&vector_with(1.0));
        assert_eq!(score.safety_score, 100.0);
        assert_eq!(score.safe, 27);
        assert!(score.flagged.is_empty());
    }

    #[test]
    fn test_default_row_is_half() {
        let scorer = RuleScorer::default();
        let score = scorer.score(&FeatureVector::defaults());
        assert_eq!(score.safety_score, 50.0);
        assert_eq!(score.neutral, 27);
        assert_eq!(scorer.assess(&FeatureVector::defaults()).result, Verdict::Dangerous);
    }

    #[test]
    fn test_flagged_signals_are_listed() {
        let mut entries = vector_with(1.0).entries().to_vec();
        entries[0].1 = -1.0;
        entries[3].1 = -1.0;
        let score = RuleScorer::default().score(&FeatureVector::from_entries(entries));

        assert_eq!(score.flagged, vec![FeatureName::UsingIp, FeatureName::AtSymbol]);
        assert_eq!(score.safety_score, round2(100.0 * 25.0 / 27.0));
    }

    #[test]
    fn test_raw_counts_are_ignored() {
        let mut entries = vector_with(1.0).entries().to_vec();
        for (name, value) in entries.iter_mut() {
            if name == "links_pointing_to_page" {
                *value = 0.0;
            }
        }
        let score = RuleScorer::default().score(&FeatureVector::from_entries(entries));
        assert_eq!(score.safety_score, 100.0);
    }

    proptest! {
        #[test]
        fn prop_score_in_range(values in prop::collection::vec(-1i8..=1, 31)) {
            let vector = FeatureVector::from_entries(
                FeatureName::ALL
                    .iter()
                    .zip(&values)
                    .map(|(f, v)| (f.as_str().to_string(), *v as f64))
                    .collect(),
            );
            let score = RuleScorer::default().score(&vector);
            prop_assert!((0.0..=100.0).contains(&score.safety_score));
            prop_assert_eq!(score.safe + score.neutral + score.suspicious, 27);
        }
    }
}
