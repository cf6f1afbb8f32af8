//! Intent categories.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{IntentError, Result};

/// The closed set of action intents a message can carry.
///
/// Variants are declared in dispatch precedence order, so the derived `Ord`
/// doubles as the precedence used to order a detection result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentCategory {
    /// Search the web.
    WebSearch,
    /// Search for places near a location.
    LocalSearch,
    /// Browser automation.
    Puppeteer,
    /// Generate an image.
    ImageGeneration,
    /// Draft social media content.
    SocialMedia,
    /// Evaluate arithmetic.
    Calculation,
    /// Greetings and small talk.
    Conversation,
    /// Answer from general knowledge.
    GeneralKnowledge,
}

impl IntentCategory {
    /// All categories in precedence order.
    pub const ALL: [IntentCategory; 8] = [
        IntentCategory::WebSearch,
        IntentCategory::LocalSearch,
        IntentCategory::Puppeteer,
        IntentCategory::ImageGeneration,
        IntentCategory::SocialMedia,
        IntentCategory::Calculation,
        IntentCategory::Conversation,
        IntentCategory::GeneralKnowledge,
    ];

    /// The wire name of this category.
    pub fn as_str(&self) -> &'static str {
        match self {
            IntentCategory::WebSearch => "web_search",
            IntentCategory::LocalSearch => "local_search",
            IntentCategory::Puppeteer => "puppeteer",
            IntentCategory::ImageGeneration => "image_generation",
            IntentCategory::SocialMedia => "social_media",
            IntentCategory::Calculation => "calculation",
            IntentCategory::Conversation => "conversation",
            IntentCategory::GeneralKnowledge => "general_knowledge",
        }
    }

    /// Position in the dispatch precedence order (0 runs first).
    pub fn precedence(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for IntentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IntentCategory {
    type Err = IntentError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        IntentCategory::ALL
            .into_iter()
            .find(|category| category.as_str() == normalized)
            .ok_or_else(|| IntentError::unknown_category(s))
    }
}
