/// Local embedding provider using fastembed
///
/// Provides offline embedding generation using all-MiniLM-L6-v2 (384 dimensions).
/// No API key required; model weights are downloaded and cached locally.
/// All CPU-bound fastembed calls are wrapped in spawn_blocking to avoid blocking async runtime.

use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio::task;

use super::{EmbeddingError, EmbeddingProvider};

/// Local embedding provider backed by fastembed.
///
/// The model is loaded once and shared read-only between candidates;
/// the Mutex only serializes access to the inference session.
pub struct LocalEmbeddingProvider {
    model: Arc<Mutex<TextEmbedding>>,
    name: String,
    dim: usize,
}

impl LocalEmbeddingProvider {
    /// Create a new LocalEmbeddingProvider, downloading model weights if not cached.
    ///
    /// # Arguments
    /// * `cache_dir` - Directory to cache model weights (fastembed downloads on first use)
    pub async fn new(cache_dir: &str) -> Result<Self, EmbeddingError> {
        let cache_path = PathBuf::from(cache_dir);

        let model = task::spawn_blocking(move || {
            std::fs::create_dir_all(&cache_path)
                .map_err(|e| EmbeddingError::ModelInit(format!("Failed to create cache dir: {}", e)))?;
            TextEmbedding::try_new(
                InitOptions::new(EmbeddingModel::AllMiniLML6V2)
                    .with_cache_dir(cache_path)
                    .with_show_download_progress(false),
            )
            .map_err(|e| EmbeddingError::ModelInit(e.to_string()))
        })
        .await
        .map_err(|e| EmbeddingError::ModelInit(e.to_string()))??;

        tracing::info!(model = "all-MiniLM-L6-v2", "Local embedding model loaded");

        Ok(LocalEmbeddingProvider {
            model: Arc::new(Mutex::new(model)),
            name: "all-MiniLM-L6-v2".to_string(),
            dim: 384,
        })
    }

    fn run_batch(&self, texts: Vec<String>) -> task::JoinHandle<Result<Vec<Vec<f32>>, EmbeddingError>> {
        let model = Arc::clone(&self.model);
        task::spawn_blocking(move || {
            let mut guard = model
                .lock()
                .map_err(|_| EmbeddingError::Generation("Embedding model lock poisoned".to_string()))?;
            guard
                .embed(texts, None)
                .map_err(|e| EmbeddingError::Generation(e.to_string()))
        })
    }
}

#[async_trait]
impl EmbeddingProvider for LocalEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.run_batch(vec![text.to_string()])
            .await
            .map_err(|e| EmbeddingError::Generation(e.to_string()))??
            .into_iter()
            .next()
            .ok_or_else(|| EmbeddingError::Generation("fastembed returned no embedding".to_string()))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let vectors = self
            .run_batch(texts.to_vec())
            .await
            .map_err(|e| EmbeddingError::Generation(e.to_string()))??;
        if vectors.len() != texts.len() {
            return Err(EmbeddingError::Generation(format!(
                "fastembed returned {} embeddings for {} inputs",
                vectors.len(),
                texts.len()
            )));
        }
        Ok(vectors)
    }

    fn model_name(&self) -> &str {
        &self.name
    }

    fn dimension(&self) -> usize {
        self.dim
    }
}
