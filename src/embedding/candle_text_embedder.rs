//! Candle-based sentence encoder.
//!
//! Runs a BERT-family model from the HuggingFace hub locally and turns token
//! embeddings into one sentence vector by attention-masked mean pooling
//! followed by L2 normalisation. Requires the `embeddings-candle` feature.

use std::sync::Arc;

use async_trait::async_trait;
use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config};
use hf_hub::api::sync::ApiBuilder;
use tokenizers::{PaddingParams, Tokenizer};

use crate::embedding::text_embedder::TextEmbedder;
use crate::embedding::vector::Vector;
use crate::error::{IntentError, Result};

/// Multilingual model used when the caller does not name one.
pub const DEFAULT_MODEL: &str = "sentence-transformers/paraphrase-multilingual-MiniLM-L12-v2";

fn candle_err(e: candle_core::Error) -> IntentError {
    IntentError::embedding(e.to_string())
}

struct Inner {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
}

impl Inner {
    /// Encode a batch of texts into normalised sentence vectors.
    fn encode(&self, texts: &[String]) -> Result<Vec<Vector>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let encodings = self
            .tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| IntentError::embedding(format!("Tokenization failed: {e}")))?;

        let mut ids = Vec::with_capacity(encodings.len());
        let mut masks = Vec::with_capacity(encodings.len());
        for encoding in &encodings {
            ids.push(Tensor::new(encoding.get_ids(), &self.device).map_err(candle_err)?);
            masks.push(Tensor::new(encoding.get_attention_mask(), &self.device).map_err(candle_err)?);
        }
        let token_ids = Tensor::stack(&ids, 0).map_err(candle_err)?;
        let attention_mask = Tensor::stack(&masks, 0).map_err(candle_err)?;
        let token_type_ids = token_ids.zeros_like().map_err(candle_err)?;

        let embeddings = self
            .model
            .forward(&token_ids, &token_type_ids, Some(&attention_mask))
            .map_err(|e| IntentError::embedding(format!("Model forward failed: {e}")))?;

        let pooled = mean_pool(&embeddings, &attention_mask)?;
        let norms = pooled
            .sqr()
            .and_then(|t| t.sum_keepdim(1))
            .and_then(|t| t.sqrt())
            .map_err(candle_err)?;
        let normalized = pooled.broadcast_div(&norms).map_err(candle_err)?;

        let rows: Vec<Vec<f32>> = normalized.to_vec2().map_err(candle_err)?;
        Ok(rows.into_iter().map(Vector::new).collect())
    }
}

/// Average token embeddings, ignoring padding positions.
fn mean_pool(embeddings: &Tensor, attention_mask: &Tensor) -> Result<Tensor> {
    let mask = attention_mask
        .unsqueeze(2)
        .and_then(|m| m.expand(embeddings.shape()))
        .and_then(|m| m.to_dtype(embeddings.dtype()))
        .map_err(candle_err)?;

    let summed = embeddings
        .mul(&mask)
        .and_then(|t| t.sum(1))
        .map_err(candle_err)?;
    let counts = mask
        .sum(1)
        .and_then(|t| t.clamp(1e-9f32, f32::MAX))
        .map_err(candle_err)?;

    summed.div(&counts).map_err(candle_err)
}

/// Candle-based sentence encoder using BERT models from HuggingFace.
///
/// # Examples
///
/// ```no_run
/// use multivio_intent::embedding::{CandleTextEmbedder, TextEmbedder};
///
/// # async fn example() -> multivio_intent::error::Result<()> {
/// let embedder = CandleTextEmbedder::new(
///     "sentence-transformers/paraphrase-multilingual-MiniLM-L12-v2"
/// )?;
/// let vectors = embedder.embed_batch(&["search for rust", "busca noticias"]).await?;
/// # Ok(())
/// # }
/// ```
pub struct CandleTextEmbedder {
    inner: Arc<Inner>,
    dimension: usize,
    model_name: String,
}

impl std::fmt::Debug for CandleTextEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CandleTextEmbedder")
            .field("model_name", &self.model_name)
            .field("dimension", &self.dimension)
            .finish()
    }
}

impl CandleTextEmbedder {
    /// Load a model from the HuggingFace hub (downloaded on first use).
    ///
    /// # Errors
    ///
    /// Returns an error if the download, the weights or the tokenizer fail to load.
    pub fn new(model_name: &str) -> Result<Self> {
        let device = Device::cuda_if_available(0)
            .map_err(|e| IntentError::embedding(format!("Device setup failed: {e}")))?;

        let cache_dir = std::env::var("HF_HOME")
            .or_else(|_| std::env::var("HOME").map(|home| format!("{home}/.cache/huggingface")))
            .unwrap_or_else(|_| "/tmp/huggingface".to_string());

        let api = ApiBuilder::new()
            .with_cache_dir(cache_dir.into())
            .build()
            .map_err(|e| IntentError::embedding(format!("HF API initialization failed: {e}")))?;
        let repo = api.model(model_name.to_string());

        let config_filename = repo
            .get("config.json")
            .map_err(|e| IntentError::embedding(format!("Config download failed: {e}")))?;
        let config: Config = serde_json::from_str(&std::fs::read_to_string(config_filename)?)?;

        let weights_filename = repo
            .get("model.safetensors")
            .map_err(|e| IntentError::embedding(format!("Weights download failed: {e}")))?;
        // SAFETY: the safetensors file is owned by the hub cache and not mutated while mapped.
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[weights_filename], DType::F32, &device)
                .map_err(|e| IntentError::embedding(format!("VarBuilder creation failed: {e}")))?
        };
        let model = BertModel::load(vb, &config)
            .map_err(|e| IntentError::embedding(format!("Model load failed: {e}")))?;

        let tokenizer_filename = repo
            .get("tokenizer.json")
            .map_err(|e| IntentError::embedding(format!("Tokenizer download failed: {e}")))?;
        let mut tokenizer = Tokenizer::from_file(tokenizer_filename)
            .map_err(|e| IntentError::embedding(format!("Tokenizer load failed: {e}")))?;
        tokenizer.with_padding(Some(PaddingParams::default()));

        Ok(Self {
            inner: Arc::new(Inner {
                model,
                tokenizer,
                device,
            }),
            dimension: config.hidden_size,
            model_name: model_name.to_string(),
        })
    }

    async fn run(&self, texts: Vec<String>) -> Result<Vec<Vector>> {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || inner.encode(&texts))
            .await
            .map_err(|e| IntentError::embedding(format!("Encoder task failed: {e}")))?
    }
}

#[async_trait]
impl TextEmbedder for CandleTextEmbedder {
    async fn embed(&self, text: &str) -> Result<Vector> {
        self.run(vec![text.to_string()])
            .await?
            .pop()
            .ok_or_else(|| IntentError::embedding("Encoder returned no vector"))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vector>> {
        self.run(texts.iter().map(|t| t.to_string()).collect()).await
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &str {
        &self.model_name
    }
}
