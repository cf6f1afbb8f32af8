//! Text embedding trait used by the embedding classifier.

use async_trait::async_trait;

use crate::embedding::vector::Vector;
use crate::error::Result;

/// Trait for converting text to vector embeddings.
///
/// This trait provides a common interface for various embedding methods
/// (local neural models, hashed term vectors, remote services) so they can be
/// injected into the [`EmbeddingClassifier`](crate::intent::EmbeddingClassifier).
///
/// Implementations are expected to return sentence-level vectors of a fixed
/// [`dimension`](TextEmbedder::dimension). Encoding is asynchronous so a host
/// serving many requests does not serialize them behind one encode.
#[async_trait]
pub trait TextEmbedder: Send + Sync {
    /// Generate an embedding vector for the given text.
    async fn embed(&self, text: &str) -> Result<Vector>;

    /// Generate embeddings for multiple texts in batch.
    ///
    /// The default implementation calls `embed` sequentially.
    /// Override this method for better performance with batch processing.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vector>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }

    /// Get the dimension of generated embeddings.
    fn dimension(&self) -> usize;

    /// Get the name/identifier of this embedder, for logging.
    fn name(&self) -> &str {
        "unknown"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct LengthEmbedder;

    #[async_trait]
    impl TextEmbedder for LengthEmbedder {
        async fn embed(&self, text: &str) -> Result<Vector> {
            Ok(Vector::new(vec![text.len() as f32, 1.0]))
        }

        fn dimension(&self) -> usize {
            2
        }
    }

    #[tokio::test]
    async fn test_default_embed_batch_preserves_order() {
        let embedder = LengthEmbedder;
        let vectors = embedder.embed_batch(&["a", "abc", ""]).await.unwrap();

        assert_eq!(vectors.len(), 3);
        assert_eq!(vectors[0].data[0], 1.0);
        assert_eq!(vectors[1].data[0], 3.0);
        assert_eq!(vectors[2].data[0], 0.0);
        assert_eq!(embedder.name(), "unknown");
    }
}
