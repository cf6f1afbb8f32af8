//! Nearest-example embedding classifier.
//!
//! Every label of the example bank is encoded once into a [`CategoryIndex`].
//! Indexes are immutable and shared behind `Arc`: a mutation builds a
//! complete replacement and publishes it with a single map insert, so a
//! reader holds either the old examples with the old vectors or the new
//! examples with the new vectors, never a mix.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use futures::future::try_join_all;
use log::{debug, info, warn};
use parking_lot::RwLock;
use rayon::prelude::*;
use tokio::sync::{Mutex, OnceCell};

use crate::embedding::{TextEmbedder, Vector};
use crate::error::{IntentError, Result};
use crate::intent::example_bank::IntentExampleBank;

/// Above this many cached vectors, similarities are computed in parallel.
const PARALLEL_SIMILARITY_THRESHOLD: usize = 512;

/// Best example of one label for a message.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingMatch {
    /// Maximum cosine similarity, clamped into `[0, 1]`.
    pub confidence: f32,
    pub matched_example: String,
    pub example_index: usize,
}

/// Encoded examples of one label.
#[derive(Debug)]
struct CategoryIndex {
    examples: Vec<String>,
    vectors: Vec<Vector>,
}

impl CategoryIndex {
    fn best_match(&self, query: &Vector) -> Option<EmbeddingMatch> {
        let mut best: Option<(usize, f32)> = None;
        for (index, vector) in self.vectors.iter().enumerate() {
            let similarity = query.cosine_similarity(vector);
            if !similarity.is_finite() {
                continue;
            }
            match best {
                Some((_, current)) if current >= similarity => {}
                _ => best = Some((index, similarity)),
            }
        }

        best.map(|(index, similarity)| EmbeddingMatch {
            confidence: similarity.clamp(0.0, 1.0),
            matched_example: self.examples[index].clone(),
            example_index: index,
        })
    }
}

/// Classifies messages by their nearest labeled example.
pub struct EmbeddingClassifier {
    encoder: Arc<dyn TextEmbedder>,
    bank: RwLock<IntentExampleBank>,
    cache: RwLock<HashMap<String, Arc<CategoryIndex>>>,
    /// Serializes cache writers; readers never take it.
    writer: Mutex<()>,
    ready: OnceCell<bool>,
}

impl std::fmt::Debug for EmbeddingClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingClassifier")
            .field("encoder", &self.encoder.name())
            .field("dimension", &self.encoder.dimension())
            .field("ready", &self.ready.get())
            .finish()
    }
}

impl EmbeddingClassifier {
    /// Create a classifier. Nothing is encoded until [`warm_up`](Self::warm_up).
    pub fn new(encoder: Arc<dyn TextEmbedder>, bank: IntentExampleBank) -> Self {
        Self {
            encoder,
            bank: RwLock::new(bank),
            cache: RwLock::new(HashMap::new()),
            writer: Mutex::new(()),
            ready: OnceCell::new(),
        }
    }

    /// Encode the whole example bank once.
    ///
    /// Returns whether the classifier is usable. A failure is logged and
    /// remembered: later calls return `false` without retrying.
    pub async fn warm_up(&self) -> bool {
        *self
            .ready
            .get_or_init(|| async {
                match self.build_cache().await {
                    Ok(count) => {
                        info!(
                            "Embedding classifier ready: {} examples encoded with {}",
                            count,
                            self.encoder.name()
                        );
                        true
                    }
                    Err(e) => {
                        warn!("Embedding classifier disabled, using patterns only: {e}");
                        false
                    }
                }
            })
            .await
    }

    /// Whether warm-up has completed successfully.
    pub fn is_ready(&self) -> bool {
        self.ready.get().copied().unwrap_or(false)
    }

    pub fn encoder_name(&self) -> &str {
        self.encoder.name()
    }

    /// A copy of the current example bank.
    pub fn bank(&self) -> IntentExampleBank {
        self.bank.read().clone()
    }

    async fn build_cache(&self) -> Result<usize> {
        let _writer = self.writer.lock().await;
        let snapshot: Vec<(String, Vec<String>)> = self
            .bank
            .read()
            .iter()
            .map(|(label, examples)| (label.to_string(), examples.to_vec()))
            .collect();

        let encoded = try_join_all(snapshot.into_iter().map(|(label, examples)| async move {
            let index = self.encode(examples).await?;
            debug!("Encoded {} examples for {label}", index.vectors.len());
            Ok::<_, IntentError>((label, index))
        }))
        .await?;

        let count = encoded.iter().map(|(_, index)| index.vectors.len()).sum();
        let cache: HashMap<String, Arc<CategoryIndex>> = encoded
            .into_iter()
            .map(|(label, index)| (label, Arc::new(index)))
            .collect();

        *self.cache.write() = cache;
        Ok(count)
    }

    /// Encode `texts` into an index. Phrases whose vector is not finite are
    /// left out, so examples and vectors stay paired.
    async fn encode(&self, texts: Vec<String>) -> Result<CategoryIndex> {
        if texts.is_empty() {
            return Ok(CategoryIndex {
                examples: Vec::new(),
                vectors: Vec::new(),
            });
        }
        let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        let vectors = self.encoder.embed_batch(&refs).await?;
        if vectors.len() != texts.len() {
            return Err(IntentError::embedding(format!(
                "encoder returned {} vectors for {} texts",
                vectors.len(),
                texts.len()
            )));
        }

        let mut index = CategoryIndex {
            examples: Vec::with_capacity(texts.len()),
            vectors: Vec::with_capacity(texts.len()),
        };
        for (text, vector) in texts.into_iter().zip(vectors) {
            vector.validate_dimension(self.encoder.dimension())?;
            if !vector.is_valid() {
                warn!("Skipping example {text:?}: encoder produced a non-finite vector");
                continue;
            }
            index.examples.push(text);
            index.vectors.push(vector);
        }
        Ok(index)
    }

    /// Best example per label, keeping only labels whose similarity is
    /// strictly greater than `threshold`.
    pub async fn classify(
        &self,
        message: &str,
        threshold: f32,
    ) -> Result<BTreeMap<String, EmbeddingMatch>> {
        if !self.warm_up().await {
            return Err(IntentError::EmbeddingUnavailable);
        }

        let query = self.encoder.embed(message).await?;
        query.validate_dimension(self.encoder.dimension())?;
        if !query.is_valid() {
            return Err(IntentError::embedding("encoder produced a non-finite query vector"));
        }

        let snapshot: Vec<(String, Arc<CategoryIndex>)> = self
            .cache
            .read()
            .iter()
            .map(|(label, index)| (label.clone(), Arc::clone(index)))
            .collect();

        let total: usize = snapshot.iter().map(|(_, index)| index.vectors.len()).sum();
        let best: Vec<(String, EmbeddingMatch)> = if total > PARALLEL_SIMILARITY_THRESHOLD {
            snapshot
                .par_iter()
                .filter_map(|(label, index)| index.best_match(&query).map(|m| (label.clone(), m)))
                .collect()
        } else {
            snapshot
                .iter()
                .filter_map(|(label, index)| index.best_match(&query).map(|m| (label.clone(), m)))
                .collect()
        };

        Ok(best
            .into_iter()
            .filter(|(_, m)| m.confidence > threshold)
            .collect())
    }

    /// Append examples to a label and publish its re-encoded index.
    ///
    /// Only the new phrases are encoded; the published index pairs the full
    /// example list with its full vector list. On encoder failure nothing
    /// changes. Returns how many examples were added, which is zero when the
    /// classifier is disabled.
    pub async fn add_examples<S: AsRef<str>>(&self, label: &str, examples: &[S]) -> Result<usize> {
        if !self.warm_up().await {
            warn!("Embedding classifier disabled, ignoring examples for {label}");
            return Ok(0);
        }
        let _writer = self.writer.lock().await;

        let added: Vec<String> = examples
            .iter()
            .map(|e| e.as_ref().trim())
            .filter(|e| !e.is_empty())
            .map(str::to_string)
            .collect();
        if added.is_empty() {
            return Ok(0);
        }

        let encoded = self.encode(added).await?;
        if encoded.examples.is_empty() {
            return Ok(0);
        }

        let current = self.cache.read().get(label).cloned();
        let (mut all_examples, mut all_vectors) = match current {
            Some(index) => (index.examples.clone(), index.vectors.clone()),
            None => (Vec::new(), Vec::new()),
        };
        all_examples.extend(encoded.examples.iter().cloned());
        all_vectors.extend(encoded.vectors);

        let index = Arc::new(CategoryIndex {
            examples: all_examples,
            vectors: all_vectors,
        });
        self.cache.write().insert(label.to_string(), index);

        let count = self
            .bank
            .write()
            .add_examples(label, encoded.examples.as_slice());
        info!("Added {count} examples to {label}");
        Ok(count)
    }

    /// The examples currently published for `label`, in index order.
    pub fn indexed_examples(&self, label: &str) -> Option<Vec<String>> {
        self.cache.read().get(label).map(|index| index.examples.clone())
    }
}
