//! Verdict Mapping

use serde::{Deserialize, Serialize};

/// Minimum safety score for a Safe verdict
const SAFE_THRESHOLD: f64 = 80.0;

/// Minimum safety score for a Moderate verdict
const MODERATE_THRESHOLD: f64 = 60.0;

/// User-facing verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    Safe,
    Moderate,
    Dangerous,
}

impl Verdict {
    /// Map a 0-100 safety score to a verdict
    pub fn from_safety_score(score: f64) -> Self {
        if score >= SAFE_THRESHOLD {
            Verdict::Safe
        } else if score >= MODERATE_THRESHOLD {
            Verdict::Moderate
        } else {
            Verdict::Dangerous
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Safe => "Safe",
            Verdict::Moderate => "Moderate",
            Verdict::Dangerous => "Dangerous",
        }
    }
}

impl std::str::FromStr for Verdict {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "safe" => Ok(Verdict::Safe),
            "moderate" => Ok(Verdict::Moderate),
            "dangerous" => Ok(Verdict::Dangerous),
            other => Err(format!("unknown verdict '{}'", other)),
        }
    }
}

/// Class probabilities as percentages
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Probabilities {
    pub legitimate: f64,
    pub phishing: f64,
}

/// Verdict with its score and probabilities
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    pub result: Verdict,
    /// 0-100, rounded to 2 decimals
    pub safety_score: f64,
    pub probabilities: Probabilities,
}

impl Assessment {
    /// From classifier probabilities in `[0, 1]`
    pub fn from_probabilities(p_legit: f64, p_phish: f64) -> Self {
        let safety_score = round2(p_legit * 100.0);
        Self {
            result: Verdict::from_safety_score(safety_score),
            safety_score,
            probabilities: Probabilities {
                legitimate: safety_score,
                phishing: round2(p_phish * 100.0),
            },
        }
    }

    /// From a 0-100 score produced without a classifier
    pub fn from_safety_score(score: f64) -> Self {
        let score = score.clamp(0.0, 100.0);
        Self::from_probabilities(score / 100.0, 1.0 - score / 100.0)
    }
}

/// Round to 2 decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
