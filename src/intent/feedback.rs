//! Intent feedback and detection statistics.
//!
//! Users may correct a detection. The correction is stored through a
//! [`FeedbackStore`] and fed back into the embedding classifier by
//! [`IntentDetector::record_feedback`](crate::intent::IntentDetector::record_feedback).

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;
use crate::intent::category::IntentCategory;
use crate::intent::types::DetectionResult;

/// A user correction of a detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRequest {
    pub message_id: String,
    pub user_id: String,
    /// Text of the corrected message.
    pub message: String,
    /// Label the message should have been detected as.
    pub correct_intent: String,
    pub feedback: Option<String>,
    /// What the detector returned for the message.
    pub detected_intents: Vec<IntentCategory>,
}

impl FeedbackRequest {
    /// Build a request from a previous detection of `message`.
    pub fn for_detection(
        message_id: impl Into<String>,
        user_id: impl Into<String>,
        message: impl Into<String>,
        correct_intent: impl Into<String>,
        detected: &DetectionResult,
    ) -> Self {
        Self {
            message_id: message_id.into(),
            user_id: user_id.into(),
            message: message.into(),
            correct_intent: correct_intent.into(),
            feedback: None,
            detected_intents: detected.categories(),
        }
    }

    pub fn with_feedback(mut self, feedback: impl Into<String>) -> Self {
        self.feedback = Some(feedback.into());
        self
    }
}

/// A stored feedback record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentFeedback {
    pub id: Uuid,
    pub message_id: String,
    pub user_id: String,
    pub correct_intent: String,
    pub feedback: String,
    pub detected_intents: Vec<IntentCategory>,
    pub created_at: DateTime<Utc>,
}

/// Result of [`IntentDetector::record_feedback`](crate::intent::IntentDetector::record_feedback).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FeedbackOutcome {
    pub id: Uuid,
    pub stored: bool,
    /// Whether the message was added as a new example.
    pub improved_model: bool,
}

/// Persistence hook for feedback.
#[async_trait]
pub trait FeedbackStore: Send + Sync {
    /// Persist one record. `Ok(false)` means the store declined it.
    async fn store_feedback(&self, feedback: IntentFeedback) -> Result<bool>;

    /// Number of records per corrected intent.
    async fn feedback_counts(&self) -> Result<Vec<(String, usize)>>;
}

/// Feedback kept in process memory.
#[derive(Debug, Default)]
pub struct InMemoryFeedbackStore {
    records: RwLock<Vec<IntentFeedback>>,
}

impl InMemoryFeedbackStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<IntentFeedback> {
        self.records.read().clone()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

#[async_trait]
impl FeedbackStore for InMemoryFeedbackStore {
    async fn store_feedback(&self, feedback: IntentFeedback) -> Result<bool> {
        self.records.write().push(feedback);
        Ok(true)
    }

    async fn feedback_counts(&self) -> Result<Vec<(String, usize)>> {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for record in self.records.read().iter() {
            *counts.entry(record.correct_intent.clone()).or_default() += 1;
        }
        Ok(counts.into_iter().collect())
    }
}

/// One past detection, as recorded by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionRecord {
    pub intents: Vec<IntentCategory>,
    pub detected_at: DateTime<Utc>,
}

impl DetectionRecord {
    pub fn new(result: &DetectionResult, detected_at: DateTime<Utc>) -> Self {
        Self {
            intents: result.categories(),
            detected_at,
        }
    }
}

/// Aggregate view of past detections and feedback.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IntentStats {
    pub intent_counts: BTreeMap<IntentCategory, usize>,
    /// Day (`YYYY-MM-DD`, UTC) → category → count.
    pub intents_by_day: BTreeMap<String, BTreeMap<IntentCategory, usize>>,
    /// `(intent, count)` sorted by descending count, then by name.
    pub feedback_stats: Vec<(String, usize)>,
}

impl IntentStats {
    pub fn compute(history: &[DetectionRecord], mut feedback_counts: Vec<(String, usize)>) -> Self {
        let mut stats = IntentStats::default();
        for record in history {
            let day = record.detected_at.format("%Y-%m-%d").to_string();
            let by_day = stats.intents_by_day.entry(day).or_default();
            for category in &record.intents {
                *stats.intent_counts.entry(*category).or_default() += 1;
                *by_day.entry(*category).or_default() += 1;
            }
        }

        feedback_counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        stats.feedback_stats = feedback_counts;
        stats
    }
}
