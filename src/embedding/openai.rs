/// OpenAI embedding provider
///
/// Calls the OpenAI Embeddings API using reqwest.
/// Supports text-embedding-3-small (1536 dimensions) by default.
/// Requires RANKER_EMBEDDING__OPENAI_API_KEY env var or openai_api_key in config.

use async_trait::async_trait;

use super::{EmbeddingError, EmbeddingProvider};

/// Request body for OpenAI Embeddings API (input may be a batch)
#[derive(serde::Serialize)]
struct EmbedRequest<'a> {
    input: &'a [String],
    model: &'a str,
}

/// Response from OpenAI Embeddings API
#[derive(serde::Deserialize)]
struct EmbedResponse {
    data: Vec<EmbedData>,
}

/// Single embedding result from OpenAI
#[derive(serde::Deserialize)]
struct EmbedData {
    index: usize,
    embedding: Vec<f32>,
}

/// OpenAI-backed embedding provider.
///
/// Requires a valid API key, checked on construction.
pub struct OpenAIEmbeddingProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    dim: usize,
}

impl OpenAIEmbeddingProvider {
    /// Create a new OpenAIEmbeddingProvider.
    ///
    /// # Errors
    /// Returns `EmbeddingError::NotConfigured` if api_key is empty.
    pub fn new(api_key: String, model: String) -> Result<Self, EmbeddingError> {
        if api_key.trim().is_empty() {
            return Err(EmbeddingError::NotConfigured(
                "OpenAI API key is required when using the openai embedding provider. \
                 Set RANKER_EMBEDDING__OPENAI_API_KEY or openai_api_key in resume-ranker.toml"
                    .to_string(),
            ));
        }

        let dim = match model.as_str() {
            "text-embedding-3-large" => 3072,
            _ => 1536,
        };

        Ok(OpenAIEmbeddingProvider {
            client: reqwest::Client::new(),
            api_key,
            model,
            dim,
        })
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAIEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.embed_batch(&[text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| EmbeddingError::Generation("API returned empty embedding list".to_string()))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let request = EmbedRequest {
            input: texts,
            model: &self.model,
        };

        let response = self
            .client
            .post("https://api.openai.com/v1/embeddings")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| EmbeddingError::Generation(format!("HTTP request failed: {}", e)))?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(EmbeddingError::Api {
                status,
                message: body,
            });
        }

        let mut embed_response: EmbedResponse = response
            .json()
            .await
            .map_err(|e| EmbeddingError::Generation(format!("Failed to parse API response: {}", e)))?;

        if embed_response.data.len() != texts.len() {
            return Err(EmbeddingError::Generation(format!(
                "API returned {} embeddings for {} inputs",
                embed_response.data.len(),
                texts.len()
            )));
        }

        // The API does not promise response order; restore input order
        embed_response.data.sort_by_key(|d| d.index);
        Ok(embed_response.data.into_iter().map(|d| d.embedding).collect())
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimension(&self) -> usize {
        self.dim
    }
}
