//! Detector configuration.
//!
//! Every tunable threshold used by the resolver lives in [`DetectorConfig`].
//! The defaults reproduce the production behaviour; a JSON file may override
//! any subset of the fields.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{IntentError, Result};

/// Configuration for [`IntentDetector`](crate::intent::IntentDetector).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Minimum nearest-example similarity (exclusive) for the embedding path.
    pub embedding_threshold: f32,
    /// Pattern score threshold (exclusive) for all categories but calculation.
    pub pattern_threshold: f32,
    /// Pattern score threshold (exclusive) for calculation.
    pub calculation_threshold: f32,
    /// Confidence floor given to calculation on the pattern path when the
    /// message is pure arithmetic.
    pub arithmetic_floor: f32,
    /// Same floor on the embedding path.
    pub embedding_arithmetic_floor: f32,
    /// Confidence floor of the conversation entry produced by the greeting override.
    pub greeting_confidence: f32,
    /// A message shorter than this many characters may count as short.
    pub short_message_max_chars: usize,
    /// A short message has at most this many words.
    pub short_message_max_words: usize,
    /// Emit `general_knowledge` when nothing else was detected. When disabled
    /// the resolver synthesizes a `conversation` entry instead.
    pub general_knowledge_fallback: bool,
    /// Run language identification on every message.
    pub detect_language: bool,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            embedding_threshold: 0.65,
            pattern_threshold: 0.2,
            calculation_threshold: 0.3,
            arithmetic_floor: 0.8,
            embedding_arithmetic_floor: 0.9,
            greeting_confidence: 0.7,
            short_message_max_chars: 10,
            short_message_max_words: 3,
            general_knowledge_fallback: true,
            detect_language: true,
        }
    }
}

impl DetectorConfig {
    /// Load a configuration from a JSON file. Missing fields take their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: DetectorConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every threshold is a probability-like value.
    pub fn validate(&self) -> Result<()> {
        let thresholds = [
            ("embedding_threshold", self.embedding_threshold),
            ("pattern_threshold", self.pattern_threshold),
            ("calculation_threshold", self.calculation_threshold),
            ("arithmetic_floor", self.arithmetic_floor),
            ("embedding_arithmetic_floor", self.embedding_arithmetic_floor),
            ("greeting_confidence", self.greeting_confidence),
        ];

        for (name, value) in thresholds {
            if !(0.0..=1.0).contains(&value) {
                return Err(IntentError::invalid_config(format!(
                    "{name} must be within [0, 1], got {value}"
                )));
            }
        }

        if self.short_message_max_chars == 0 {
            return Err(IntentError::invalid_config(
                "short_message_max_chars must be greater than zero",
            ));
        }

        Ok(())
    }
}
