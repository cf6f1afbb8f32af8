//! Hashed term-frequency embedder.
//!
//! Produces deterministic dense vectors by hashing word unigrams and
//! character trigrams into a fixed number of buckets. It is not as
//! semantically rich as a neural sentence encoder, but it needs no model
//! files and works on any script, which makes it a usable offline encoder
//! and a predictable one for tests.

use std::collections::HashMap;

use async_trait::async_trait;
use unicode_segmentation::UnicodeSegmentation;

use crate::embedding::text_embedder::TextEmbedder;
use crate::embedding::vector::Vector;
use crate::error::{IntentError, Result};

/// Default number of buckets.
pub const DEFAULT_DIMENSION: usize = 384;

/// Weight of a character trigram relative to a whole word.
const TRIGRAM_WEIGHT: f32 = 0.5;

/// Deterministic hashing text embedder.
#[derive(Debug, Clone)]
pub struct HashingTextEmbedder {
    dimension: usize,
}

impl Default for HashingTextEmbedder {
    fn default() -> Self {
        Self {
            dimension: DEFAULT_DIMENSION,
        }
    }
}

impl HashingTextEmbedder {
    /// Create an embedder producing vectors of `dimension` buckets.
    pub fn new(dimension: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(IntentError::invalid_argument(
                "embedding dimension must be greater than zero",
            ));
        }
        Ok(Self { dimension })
    }

    /// Hash a feature into a bucket index using FNV-1a.
    fn bucket(feature: &str, dimension: usize) -> usize {
        let mut h: u64 = 0xcbf29ce484222325;
        for b in feature.as_bytes() {
            h ^= *b as u64;
            h = h.wrapping_mul(0x100000001b3);
        }
        (h % dimension as u64) as usize
    }

    /// Weighted features of a text: lowercased words and their character trigrams.
    fn features(text: &str) -> HashMap<String, f32> {
        let mut features: HashMap<String, f32> = HashMap::new();
        for word in text.unicode_words() {
            let word = word.to_lowercase();
            *features.entry(format!("w:{word}")).or_default() += 1.0;

            let chars: Vec<char> = format!("^{word}$").chars().collect();
            for window in chars.windows(3) {
                let trigram: String = window.iter().collect();
                *features.entry(format!("c:{trigram}")).or_default() += TRIGRAM_WEIGHT;
            }
        }
        features
    }

    fn encode(&self, text: &str) -> Vector {
        let mut data = vec![0.0f32; self.dimension];
        for (feature, weight) in Self::features(text) {
            data[Self::bucket(&feature, self.dimension)] += weight;
        }
        let mut vector = Vector::new(data);
        vector.normalize();
        vector
    }
}

#[async_trait]
impl TextEmbedder for HashingTextEmbedder {
    async fn embed(&self, text: &str) -> Result<Vector> {
        Ok(self.encode(text))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vector>> {
        Ok(texts.iter().map(|text| self.encode(text)).collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &str {
        "hashing"
    }
}
