/// Embedding provider trait and supporting types
///
/// Provides a pluggable interface for text embedding generation.
/// Supports local fastembed models (default, no API key) and OpenAI API.
/// The semantic skill scorer receives a provider by injection; a missing
/// provider is the explicit "unavailable" state.

pub mod local;
pub mod openai;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::config::EmbeddingConfig;

/// Errors that can occur during embedding operations.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    /// fastembed model initialization failure
    #[error("Model initialization error: {0}")]
    ModelInit(String),

    /// Embedding generation failure (inference error)
    #[error("Embedding generation error: {0}")]
    Generation(String),

    /// API provider returned an HTTP error
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Provider not configured (e.g., missing API key)
    #[error("Provider not configured: {0}")]
    NotConfigured(String),
}

/// Core trait for embedding text into fixed-dimension float vectors.
///
/// Implementations must be Send + Sync to support use in async contexts
/// and across thread boundaries (e.g., Arc<dyn EmbeddingProvider>).
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding vector for the given text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Generate embeddings for several texts, in input order.
    ///
    /// The default embeds one text at a time; backends with native batching override it.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }

    /// Return the model name identifier (e.g., "all-MiniLM-L6-v2").
    fn model_name(&self) -> &str;

    /// Return the dimension of the embedding vectors produced by this model.
    fn dimension(&self) -> usize;
}

/// Cosine similarity in [-1, 1]. Zero-norm or mismatched vectors score 0.0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b.iter()) {
        let (x, y) = (*x as f64, *y as f64);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(-1.0, 1.0)
}

/// Create the embedding provider named in configuration.
///
/// Returns `Ok(None)` for provider "none". Initialization failures are
/// returned so the caller can decide to continue without embeddings.
pub async fn create_embedding_provider(
    config: &EmbeddingConfig,
) -> Result<Option<Arc<dyn EmbeddingProvider>>, EmbeddingError> {
    match config.provider.as_str() {
        "none" => Ok(None),
        "openai" => {
            let api_key = config.openai_api_key.clone().ok_or_else(|| {
                EmbeddingError::NotConfigured(
                    "OpenAI API key required when embedding provider is 'openai'. \
                     Set RANKER_EMBEDDING__OPENAI_API_KEY or embedding.openai_api_key in resume-ranker.toml"
                        .to_string(),
                )
            })?;
            Ok(Some(Arc::new(openai::OpenAIEmbeddingProvider::new(
                api_key,
                config.openai_model.clone(),
            )?)))
        }
        _ => Ok(Some(Arc::new(
            local::LocalEmbeddingProvider::new(&config.cache_dir).await?,
        ))),
    }
}
