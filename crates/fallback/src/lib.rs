//! Rule-Based Fallback
//!
//! Scores raw feature vectors from their tri-state signals when no trained
//! classifier is available.

mod rules;

pub use rules::{RuleConfig, RuleScore, RuleScorer};
