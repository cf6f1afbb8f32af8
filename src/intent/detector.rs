//! Intent resolver.
//!
//! [`IntentDetector::detect_intents`] is the top-level entry point. It tries
//! the embedding classifier first, falls back to pattern scoring, applies the
//! conflict rules and always returns at least one intent.

use std::sync::Arc;

use chrono::Utc;
use log::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::DetectorConfig;
use crate::embedding::TextEmbedder;
use crate::error::{IntentError, Result};
use crate::intent::category::IntentCategory;
use crate::intent::embedding_classifier::EmbeddingClassifier;
use crate::intent::example_bank::IntentExampleBank;
use crate::intent::extractor::extract;
use crate::intent::feedback::{FeedbackOutcome, FeedbackRequest, FeedbackStore, IntentFeedback};
use crate::intent::language::{LanguageDetector, ScriptLanguageDetector};
use crate::intent::patterns::{is_greeting, is_pure_arithmetic};
use crate::intent::scorer::score_all;
use crate::intent::types::{DetectionResult, DetectionSource, IntentMatch, UNKNOWN_LANGUAGE};

/// Confidence at which an intent counts as strong for coverage purposes.
const STRONG_CONFIDENCE: f32 = 0.5;

/// How much a `general_knowledge` answer is still needed given the intents
/// already detected.
///
/// * `1.0` when nothing was detected
/// * `0.8` when every detected intent is weak
/// * `0.5` when some intent is strong
/// * `0.2` when a strong search intent and a strong social media intent
///   together cover the message
pub fn general_knowledge_coverage(result: &DetectionResult) -> f32 {
    let strong = |category| {
        result
            .get(category)
            .is_some_and(|m| m.confidence >= STRONG_CONFIDENCE)
    };

    if result.is_empty() {
        1.0
    } else if (strong(IntentCategory::WebSearch) || strong(IntentCategory::LocalSearch))
        && strong(IntentCategory::SocialMedia)
    {
        0.2
    } else if result.iter().all(|(_, m)| m.confidence < STRONG_CONFIDENCE) {
        0.8
    } else {
        0.5
    }
}

/// Drop `web_search` in favour of `calculation` for pure arithmetic.
fn apply_arithmetic_tie_break(result: &mut DetectionResult, message: &str, floor: f32) {
    if !(result.contains(IntentCategory::Calculation) && result.contains(IntentCategory::WebSearch))
    {
        return;
    }
    if !is_pure_arithmetic(message) {
        return;
    }

    result.remove(IntentCategory::WebSearch);
    if let Some(calculation) = result.get_mut(IntentCategory::Calculation) {
        calculation.raise_to(floor);
    }
    debug!("Pure arithmetic: web_search dropped in favour of calculation");
}

/// `general_knowledge` only stands alone, and only when the fallback is on.
fn restrict_general_knowledge(result: &mut DetectionResult, fallback_enabled: bool) {
    if !result.contains(IntentCategory::GeneralKnowledge) {
        return;
    }
    if !fallback_enabled || result.len() > 1 {
        result.remove(IntentCategory::GeneralKnowledge);
        debug!("general_knowledge dropped from the detected intents");
    }
}

/// Detects the intents of chat messages.
///
/// Construct one per process and share it; all methods take `&self`.
pub struct IntentDetector {
    config: DetectorConfig,
    classifier: Option<EmbeddingClassifier>,
    language_detector: Arc<dyn LanguageDetector>,
}

impl std::fmt::Debug for IntentDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntentDetector")
            .field("config", &self.config)
            .field("classifier", &self.classifier)
            .finish()
    }
}

impl IntentDetector {
    /// A pattern-only detector.
    pub fn new(config: DetectorConfig) -> Self {
        Self {
            config,
            classifier: None,
            language_detector: Arc::new(ScriptLanguageDetector::new()),
        }
    }

    /// A detector using `encoder` over the built-in example bank.
    pub fn with_encoder(config: DetectorConfig, encoder: Arc<dyn TextEmbedder>) -> Self {
        Self::with_classifier(
            config,
            EmbeddingClassifier::new(encoder, IntentExampleBank::default()),
        )
    }

    pub fn with_classifier(config: DetectorConfig, classifier: EmbeddingClassifier) -> Self {
        Self {
            classifier: Some(classifier),
            ..Self::new(config)
        }
    }

    /// Replace the language detector.
    pub fn with_language_detector(mut self, detector: Arc<dyn LanguageDetector>) -> Self {
        self.language_detector = detector;
        self
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    pub fn classifier(&self) -> Option<&EmbeddingClassifier> {
        self.classifier.as_ref()
    }

    /// Encode the example bank ahead of the first message.
    ///
    /// Returns whether the embedding path is available.
    pub async fn warm_up(&self) -> bool {
        match &self.classifier {
            Some(classifier) => classifier.warm_up().await,
            None => false,
        }
    }

    /// Detect the intents of a message.
    ///
    /// Never fails and never returns an empty result.
    pub async fn detect_intents(&self, message: &str) -> DetectionResult {
        let language = self.language_of(message);

        let mut result = match self.detect_with_embeddings(message, &language).await {
            Some(result) if !result.is_empty() => result,
            _ => self.pattern_candidates(message, &language),
        };

        self.resolve(message, &language, &mut result);
        debug!("Detected intents for {message:?}: {:?}", result.categories());
        result
    }

    /// Detect intents with pattern scoring only.
    pub fn detect_with_patterns(&self, message: &str) -> DetectionResult {
        let language = self.language_of(message);
        let mut result = self.pattern_candidates(message, &language);
        self.resolve(message, &language, &mut result);
        result
    }

    fn language_of(&self, message: &str) -> String {
        if !self.config.detect_language {
            return UNKNOWN_LANGUAGE.to_string();
        }
        match self.language_detector.detect(message) {
            Ok(language) => language,
            Err(e) => {
                debug!("Language detection failed: {e}");
                UNKNOWN_LANGUAGE.to_string()
            }
        }
    }

    /// Embedding path. `None` means the caller must use the pattern path.
    async fn detect_with_embeddings(&self, message: &str, language: &str) -> Option<DetectionResult> {
        let classifier = self.classifier.as_ref()?;
        if !classifier.warm_up().await {
            return None;
        }

        let matches = match classifier
            .classify(message, self.config.embedding_threshold)
            .await
        {
            Ok(matches) => matches,
            Err(e) => {
                warn!("Embedding classification failed, falling back to patterns: {e}");
                return None;
            }
        };

        let mut result = DetectionResult::new();
        for (label, m) in matches {
            let Ok(category) = label.parse::<IntentCategory>() else {
                debug!("Ignoring match for unmapped label {label}");
                continue;
            };
            let intent = IntentMatch::new(
                m.confidence,
                DetectionSource::Embedding,
                extract(category, message),
            )
            .with_language(language)
            .with_matched_example(Some(m.matched_example));
            result.insert(category, intent);
        }

        apply_arithmetic_tie_break(&mut result, message, self.config.embedding_arithmetic_floor);
        restrict_general_knowledge(&mut result, self.config.general_knowledge_fallback);
        Some(result)
    }

    fn pattern_candidates(&self, message: &str, language: &str) -> DetectionResult {
        let mut result = DetectionResult::new();
        for (category, score) in score_all(message) {
            let threshold = match category {
                IntentCategory::Calculation => self.config.calculation_threshold,
                _ => self.config.pattern_threshold,
            };
            if score > threshold {
                let intent = IntentMatch::new(score, DetectionSource::Pattern, extract(category, message))
                    .with_language(language);
                result.insert(category, intent);
            }
        }

        apply_arithmetic_tie_break(&mut result, message, self.config.arithmetic_floor);
        result
    }

    fn is_short(&self, message: &str) -> bool {
        let trimmed = message.trim();
        trimmed.chars().count() < self.config.short_message_max_chars
            && trimmed.split_whitespace().count() <= self.config.short_message_max_words
    }

    /// Greeting override, then the fallbacks that keep the result non-empty.
    fn resolve(&self, message: &str, language: &str, result: &mut DetectionResult) {
        if self.is_short(message) || is_greeting(message) {
            let floor = self.config.greeting_confidence;
            match result.get_mut(IntentCategory::Conversation) {
                Some(conversation) => conversation.raise_to(floor),
                None => {
                    let intent = IntentMatch::new(
                        floor,
                        DetectionSource::Override,
                        extract(IntentCategory::Conversation, message),
                    )
                    .with_language(language);
                    result.insert(IntentCategory::Conversation, intent);
                }
            }
        }
        restrict_general_knowledge(result, self.config.general_knowledge_fallback);

        if result.is_empty() && self.config.general_knowledge_fallback {
            let intent = IntentMatch::new(
                general_knowledge_coverage(result),
                DetectionSource::Fallback,
                extract(IntentCategory::GeneralKnowledge, message),
            )
            .with_language(language);
            result.insert(IntentCategory::GeneralKnowledge, intent);
        }

        if result.is_empty() {
            let intent = IntentMatch::new(
                self.config.greeting_confidence,
                DetectionSource::Fallback,
                extract(IntentCategory::Conversation, message),
            )
            .with_language(language);
            result.insert(IntentCategory::Conversation, intent);
        }
    }

    /// Append examples to a label of the embedding classifier.
    ///
    /// Labels naming a category are normalised to its wire name; any other
    /// label is created as given.
    pub async fn add_examples<S: AsRef<str> + Sync>(
        &self,
        label: &str,
        examples: &[S],
    ) -> Result<usize> {
        let classifier = self
            .classifier
            .as_ref()
            .ok_or(IntentError::EmbeddingUnavailable)?;
        let label = match label.parse::<IntentCategory>() {
            Ok(category) => category.as_str().to_string(),
            Err(_) => label.trim().to_string(),
        };
        if label.is_empty() {
            return Err(IntentError::invalid_argument("label must not be empty"));
        }
        classifier.add_examples(&label, examples).await
    }

    /// Store user feedback and teach the classifier the corrected message.
    ///
    /// Failing to add the example is logged; a request without a message or
    /// user id and a storage failure are errors.
    pub async fn record_feedback(
        &self,
        store: &dyn FeedbackStore,
        request: FeedbackRequest,
    ) -> Result<FeedbackOutcome> {
        if request.message_id.trim().is_empty() {
            return Err(IntentError::feedback("message id is empty"));
        }
        if request.user_id.trim().is_empty() {
            return Err(IntentError::feedback("user id is empty"));
        }

        let id = Uuid::new_v4();
        let record = IntentFeedback {
            id,
            message_id: request.message_id,
            user_id: request.user_id,
            correct_intent: request.correct_intent.clone(),
            feedback: request.feedback.unwrap_or_default(),
            detected_intents: request.detected_intents,
            created_at: Utc::now(),
        };

        let stored = store.store_feedback(record).await.inspect_err(|e| {
            error!("Failed to store intent feedback: {e}");
        })?;
        if !stored {
            return Ok(FeedbackOutcome {
                id,
                stored,
                improved_model: false,
            });
        }
        info!("Recorded feedback {id} for intent {}", request.correct_intent);

        let mut improved_model = false;
        if !request.message.trim().is_empty() && !request.correct_intent.trim().is_empty() {
            match self
                .add_examples(&request.correct_intent, &[request.message.as_str()])
                .await
            {
                Ok(added) => improved_model = added > 0,
                Err(e) => error!("Error adding example to intent model: {e}"),
            }
        }

        Ok(FeedbackOutcome {
            id,
            stored,
            improved_model,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::types::IntentParams;

    fn detector() -> IntentDetector {
        IntentDetector::new(DetectorConfig::default())
    }

    #[test]
    fn test_pure_arithmetic_drops_web_search() {
        let result = detector().detect_with_patterns("what is 10+10");
        assert!(!result.contains(IntentCategory::WebSearch));
        let calculation = result.get(IntentCategory::Calculation).unwrap();
        assert!(calculation.confidence >= 0.8);
    }

    #[test]
    fn test_question_keeps_web_search() {
        let result = detector().detect_with_patterns("what is the capital of france");
        assert!(result.contains(IntentCategory::WebSearch));
        assert!(!result.contains(IntentCategory::Calculation));
    }

    #[test]
    fn test_greeting_override() {
        let result = detector().detect_with_patterns("hi");
        let conversation = result.get(IntentCategory::Conversation).unwrap();
        assert!(conversation.confidence >= 0.7);

        let result = detector().detect_with_patterns("hello, can you search for rust tutorials");
        assert!(result.contains(IntentCategory::Conversation));
        assert!(result.contains(IntentCategory::WebSearch));
    }

    #[test]
    fn test_unmatched_message_falls_back_to_general_knowledge() {
        let result = detector().detect_with_patterns("photosynthesis in deciduous plants");
        assert_eq!(result.categories(), vec![IntentCategory::GeneralKnowledge]);
        let record = result.get(IntentCategory::GeneralKnowledge).unwrap();
        assert_eq!(record.confidence, 1.0);
        assert_eq!(record.source, DetectionSource::Fallback);
    }

    #[test]
    fn test_conversation_fallback_when_general_knowledge_is_disabled() {
        let config = DetectorConfig {
            general_knowledge_fallback: false,
            ..DetectorConfig::default()
        };
        let result = IntentDetector::new(config).detect_with_patterns("photosynthesis in deciduous plants");
        let record = result.get(IntentCategory::Conversation).unwrap();
        assert_eq!(record.confidence, 0.7);
        assert!(matches!(
            &record.params,
            IntentParams::Conversation { kind, .. } if kind == "general_conversation"
        ));
    }

    #[test]
    fn test_language_is_attached() {
        let result = detector().detect_with_patterns("search for the latest news");
        assert_eq!(result.get(IntentCategory::WebSearch).unwrap().language, "en");

        let config = DetectorConfig {
            detect_language: false,
            ..DetectorConfig::default()
        };
        let result = IntentDetector::new(config).detect_with_patterns("search for the latest news");
        assert_eq!(
            result.get(IntentCategory::WebSearch).unwrap().language,
            UNKNOWN_LANGUAGE
        );
    }

    #[test]
    fn test_general_knowledge_coverage_levels() {
        let query = |q: &str| IntentParams::Query { query: q.to_string() };
        let mut result = DetectionResult::new();
        assert_eq!(general_knowledge_coverage(&result), 1.0);

        result.insert(
            IntentCategory::WebSearch,
            IntentMatch::new(0.4, DetectionSource::Pattern, query("a")),
        );
        assert_eq!(general_knowledge_coverage(&result), 0.8);

        result.insert(
            IntentCategory::WebSearch,
            IntentMatch::new(0.6, DetectionSource::Pattern, query("a")),
        );
        assert_eq!(general_knowledge_coverage(&result), 0.5);

        result.insert(
            IntentCategory::SocialMedia,
            IntentMatch::new(0.7, DetectionSource::Pattern, query("a")),
        );
        assert_eq!(general_knowledge_coverage(&result), 0.2);
    }

    #[test]
    fn test_add_examples_without_classifier_is_unavailable() {
        let detector = detector();
        let result = tokio_test::block_on(detector.add_examples("web_search", &["x"]));
        assert!(matches!(result, Err(IntentError::EmbeddingUnavailable)));
        assert!(!tokio_test::block_on(detector.warm_up()));
    }

    #[test]
    fn test_general_knowledge_only_stands_alone() {
        let query = |q: &str| IntentParams::Query { query: q.to_string() };
        let mut result = DetectionResult::new();
        result.insert(
            IntentCategory::GeneralKnowledge,
            IntentMatch::new(0.9, DetectionSource::Embedding, query("a")),
        );
        restrict_general_knowledge(&mut result, true);
        assert_eq!(result.categories(), vec![IntentCategory::GeneralKnowledge]);

        result.insert(
            IntentCategory::WebSearch,
            IntentMatch::new(0.9, DetectionSource::Embedding, query("a")),
        );
        restrict_general_knowledge(&mut result, true);
        assert_eq!(result.categories(), vec![IntentCategory::WebSearch]);

        let mut result = DetectionResult::new();
        result.insert(
            IntentCategory::GeneralKnowledge,
            IntentMatch::new(0.9, DetectionSource::Embedding, query("a")),
        );
        restrict_general_knowledge(&mut result, false);
        assert!(result.is_empty());
    }

    #[test]
    fn test_feedback_requires_ids() {
        use crate::intent::feedback::InMemoryFeedbackStore;

        let detector = detector();
        let store = InMemoryFeedbackStore::new();
        let request = FeedbackRequest {
            message_id: " ".to_string(),
            user_id: "user-1".to_string(),
            message: "what is 2+2".to_string(),
            correct_intent: "calculation".to_string(),
            feedback: None,
            detected_intents: Vec::new(),
        };

        let result = tokio_test::block_on(detector.record_feedback(&store, request));
        assert!(matches!(result, Err(IntentError::Feedback(_))));
        assert!(store.is_empty());
    }
}
