//! Text embedding support for the embedding classifier.
//!
//! This module provides a trait-based interface for converting text to vector
//! embeddings. The intent detector treats the encoder as a black box: any
//! implementation of [`TextEmbedder`] can be injected.
//!
//! # Feature Flags
//!
//! - `embeddings-candle` - HuggingFace Candle implementation (local inference)
//!
//! Without any feature the crate ships [`HashingTextEmbedder`], a
//! deterministic model-free encoder that works offline.
//!
//! # Usage
//!
//! ## Using Candle
//!
//! ```no_run
//! # #[cfg(feature = "embeddings-candle")]
//! # {
//! use multivio_intent::embedding::{CandleTextEmbedder, TextEmbedder};
//!
//! # async fn example() -> multivio_intent::error::Result<()> {
//! let embedder = CandleTextEmbedder::new(
//!     "sentence-transformers/paraphrase-multilingual-MiniLM-L12-v2"
//! )?;
//!
//! let vector = embedder.embed("Hola, ¿qué tal?").await?;
//! println!("Dimension: {}", embedder.dimension());
//! # Ok(())
//! # }
//! # }
//! ```
//!
//! ## Custom Implementation
//!
//! ```
//! use async_trait::async_trait;
//! use multivio_intent::embedding::{TextEmbedder, Vector};
//! use multivio_intent::error::Result;
//!
//! struct MyEmbedder {
//!     dimension: usize,
//! }
//!
//! #[async_trait]
//! impl TextEmbedder for MyEmbedder {
//!     async fn embed(&self, _text: &str) -> Result<Vector> {
//!         Ok(Vector::new(vec![0.0; self.dimension]))
//!     }
//!
//!     fn dimension(&self) -> usize {
//!         self.dimension
//!     }
//! }
//! ```

pub mod hashing_embedder;
pub mod text_embedder;
pub mod vector;

// Candle implementation (requires feature flag)
#[cfg(feature = "embeddings-candle")]
pub mod candle_text_embedder;

pub use hashing_embedder::HashingTextEmbedder;
pub use text_embedder::TextEmbedder;
pub use vector::Vector;

#[cfg(feature = "embeddings-candle")]
pub use candle_text_embedder::CandleTextEmbedder;
