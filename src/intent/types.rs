//! Detection result types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::intent::category::IntentCategory;

/// Language code reported when identification fails or is disabled.
pub const UNKNOWN_LANGUAGE: &str = "unknown";

/// Structured fields extracted for one intent.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum IntentParams {
    LocalSearch {
        query: String,
        location: Option<String>,
    },
    Puppeteer {
        url: Option<String>,
        action: String,
    },
    SocialMedia {
        platforms: Vec<String>,
        content_types: Vec<String>,
        prompt: String,
    },
    ImageGeneration {
        prompt: String,
    },
    Calculation {
        expression: String,
    },
    Conversation {
        query: String,
        #[serde(rename = "type")]
        kind: String,
    },
    /// Shared by web search and general knowledge.
    Query {
        query: String,
    },
}

impl IntentParams {
    /// The main free-text field of these parameters.
    pub fn text(&self) -> Option<&str> {
        match self {
            IntentParams::LocalSearch { query, .. }
            | IntentParams::Conversation { query, .. }
            | IntentParams::Query { query } => Some(query),
            IntentParams::SocialMedia { prompt, .. } | IntentParams::ImageGeneration { prompt } => {
                Some(prompt)
            }
            IntentParams::Calculation { expression } => Some(expression),
            IntentParams::Puppeteer { url, .. } => url.as_deref(),
        }
    }
}

/// Which stage of the resolver produced an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionSource {
    /// Nearest-example embedding similarity.
    Embedding,
    /// Regex pattern scoring.
    Pattern,
    /// Greeting / short-message override.
    Override,
    /// Synthesized because nothing else was detected.
    Fallback,
}

/// One detected intent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntentMatch {
    /// Heuristic detection strength in `[0, 1]`.
    pub confidence: f32,
    /// Best-effort language code of the message.
    pub language: String,
    /// Example phrase that matched on the embedding path.
    pub matched_example: Option<String>,
    pub source: DetectionSource,
    #[serde(flatten)]
    pub params: IntentParams,
}

impl IntentMatch {
    /// Create a match, clamping the confidence into `[0, 1]`.
    pub fn new(confidence: f32, source: DetectionSource, params: IntentParams) -> Self {
        Self {
            confidence: clamp_confidence(confidence),
            language: UNKNOWN_LANGUAGE.to_string(),
            matched_example: None,
            source,
            params,
        }
    }

    pub fn with_language<S: Into<String>>(mut self, language: S) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_matched_example(mut self, example: Option<String>) -> Self {
        self.matched_example = example;
        self
    }

    /// Raise the confidence to at least `floor`.
    pub fn raise_to(&mut self, floor: f32) {
        self.confidence = clamp_confidence(self.confidence.max(floor));
    }
}

/// Clamp a raw score into `[0, 1]`; NaN becomes `0`.
pub fn clamp_confidence(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// The intents detected in one message, ordered by category precedence.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DetectionResult {
    intents: BTreeMap<IntentCategory, IntentMatch>,
}

impl DetectionResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, category: IntentCategory, intent: IntentMatch) -> Option<IntentMatch> {
        self.intents.insert(category, intent)
    }

    pub fn remove(&mut self, category: IntentCategory) -> Option<IntentMatch> {
        self.intents.remove(&category)
    }

    pub fn get(&self, category: IntentCategory) -> Option<&IntentMatch> {
        self.intents.get(&category)
    }

    pub fn get_mut(&mut self, category: IntentCategory) -> Option<&mut IntentMatch> {
        self.intents.get_mut(&category)
    }

    pub fn contains(&self, category: IntentCategory) -> bool {
        self.intents.contains_key(&category)
    }

    pub fn len(&self) -> usize {
        self.intents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intents.is_empty()
    }

    /// Detected categories in precedence order.
    pub fn categories(&self) -> Vec<IntentCategory> {
        self.intents.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&IntentCategory, &IntentMatch)> {
        self.intents.iter()
    }

    /// The most confident intent; precedence breaks ties.
    pub fn primary(&self) -> Option<(IntentCategory, &IntentMatch)> {
        let mut best: Option<(IntentCategory, &IntentMatch)> = None;
        for (category, intent) in &self.intents {
            match best {
                Some((_, current)) if current.confidence >= intent.confidence => {}
                _ => best = Some((*category, intent)),
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(q: &str) -> IntentParams {
        IntentParams::Query {
            query: q.to_string(),
        }
    }

    #[test]
    fn test_confidence_is_clamped() {
        let m = IntentMatch::new(1.7, DetectionSource::Pattern, query("x"));
        assert_eq!(m.confidence, 1.0);
        let m = IntentMatch::new(-0.2, DetectionSource::Pattern, query("x"));
        assert_eq!(m.confidence, 0.0);
        assert_eq!(clamp_confidence(f32::NAN), 0.0);
    }

    #[test]
    fn test_raise_to_never_lowers() {
        let mut m = IntentMatch::new(0.95, DetectionSource::Pattern, query("x"));
        m.raise_to(0.8);
        assert_eq!(m.confidence, 0.95);
        m.raise_to(0.99);
        assert_eq!(m.confidence, 0.99);
    }

    #[test]
    fn test_primary_prefers_confidence_then_precedence() {
        let mut result = DetectionResult::new();
        result.insert(
            IntentCategory::SocialMedia,
            IntentMatch::new(0.6, DetectionSource::Pattern, query("a")),
        );
        result.insert(
            IntentCategory::WebSearch,
            IntentMatch::new(0.6, DetectionSource::Pattern, query("b")),
        );
        assert_eq!(result.primary().unwrap().0, IntentCategory::WebSearch);

        result.insert(
            IntentCategory::Calculation,
            IntentMatch::new(0.9, DetectionSource::Pattern, query("c")),
        );
        assert_eq!(result.primary().unwrap().0, IntentCategory::Calculation);
        assert_eq!(
            result.categories(),
            vec![
                IntentCategory::WebSearch,
                IntentCategory::SocialMedia,
                IntentCategory::Calculation
            ]
        );
    }

    #[test]
    fn test_serialized_record_is_flat() {
        let mut result = DetectionResult::new();
        result.insert(
            IntentCategory::Conversation,
            IntentMatch::new(
                0.7,
                DetectionSource::Fallback,
                IntentParams::Conversation {
                    query: "hm".to_string(),
                    kind: "general_conversation".to_string(),
                },
            ),
        );

        let value = serde_json::to_value(&result).unwrap();
        let record = &value["conversation"];
        assert_eq!(record["type"], "general_conversation");
        assert_eq!(record["query"], "hm");
        assert_eq!(record["language"], "unknown");
        assert_eq!(record["source"], "fallback");
        assert!(record["matched_example"].is_null());
    }
}
