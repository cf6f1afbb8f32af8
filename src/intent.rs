//! Intent detection.
//!
//! A message is classified into one or more [`IntentCategory`] values. The
//! [`IntentDetector`] tries the [`EmbeddingClassifier`] first and falls back
//! to regex pattern scoring, then resolves conflicts between overlapping
//! intents. Per-intent parameters (search query, URL, image prompt, ...) are
//! extracted for every detected intent.
//!
//! # Example
//!
//! ```
//! use multivio_intent::config::DetectorConfig;
//! use multivio_intent::intent::{IntentCategory, IntentDetector};
//!
//! let detector = IntentDetector::new(DetectorConfig::default());
//! let result = detector.detect_with_patterns("what is 10+10");
//!
//! assert!(result.contains(IntentCategory::Calculation));
//! assert!(!result.contains(IntentCategory::WebSearch));
//! ```

pub mod category;
pub mod detector;
pub mod dispatch;
pub mod embedding_classifier;
pub mod example_bank;
pub mod extractor;
pub mod feedback;
pub mod language;
pub mod patterns;
pub mod scorer;
pub mod types;

pub use category::IntentCategory;
pub use detector::{IntentDetector, general_knowledge_coverage};
pub use dispatch::{DispatchAction, DispatchPlan, DispatchStep};
pub use embedding_classifier::{EmbeddingClassifier, EmbeddingMatch};
pub use example_bank::IntentExampleBank;
pub use feedback::{
    DetectionRecord, FeedbackOutcome, FeedbackRequest, FeedbackStore, InMemoryFeedbackStore,
    IntentFeedback, IntentStats,
};
pub use language::{LanguageDetector, ScriptLanguageDetector};
pub use patterns::PatternSet;
pub use types::{DetectionResult, DetectionSource, IntentMatch, IntentParams, UNKNOWN_LANGUAGE};
