/// Text generation provider trait and supporting types
///
/// Provides a pluggable interface for free-text completions used by the
/// experience rater and the profile extractor.
/// Supports Ollama (local, default, no API key) and OpenAI-compatible APIs.

pub mod ollama;
pub mod openai;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::config::GenerationConfig;

/// Errors that can occur while calling a text generation backend.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Connection, DNS, or body read failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// API provider returned an HTTP error
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Call exceeded its time budget
    #[error("Generation timed out after {0:?}")]
    Timeout(Duration),

    /// Backend answered without any content
    #[error("Model returned an empty response")]
    EmptyResponse,

    /// Provider not configured (e.g., missing API key)
    #[error("Provider not configured: {0}")]
    NotConfigured(String),
}

/// Core trait for prompt-in, text-out generation.
///
/// Implementations must be Send + Sync to support use in async contexts
/// and across thread boundaries (e.g., Arc<dyn TextGenerator>).
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Return the model's completion for a single-turn prompt.
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;

    /// Return the model name identifier used by this provider.
    fn model_name(&self) -> &str;
}

/// Build a reqwest client that enforces the per-call timeout.
pub(crate) fn http_client(timeout: Duration) -> Result<reqwest::Client, GenerationError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| GenerationError::NotConfigured(format!("Failed to build HTTP client: {}", e)))
}

/// Map a reqwest failure onto the generation error taxonomy.
pub(crate) fn transport_error(e: reqwest::Error, timeout: Duration) -> GenerationError {
    if e.is_timeout() {
        GenerationError::Timeout(timeout)
    } else {
        GenerationError::Transport(e.to_string())
    }
}

/// Create the text generator named in configuration.
pub fn create_text_generator(
    config: &GenerationConfig,
) -> Result<Arc<dyn TextGenerator>, GenerationError> {
    let timeout = Duration::from_secs(config.timeout_secs.max(1));
    match config.provider.as_str() {
        "openai" => {
            let api_key = config.openai_api_key.clone().ok_or_else(|| {
                GenerationError::NotConfigured(
                    "OpenAI API key required when generation provider is 'openai'. \
                     Set RANKER_GENERATION__OPENAI_API_KEY or generation.openai_api_key in resume-ranker.toml"
                        .to_string(),
                )
            })?;
            Ok(Arc::new(openai::OpenAIGenerator::new(
                config.openai_base_url.clone(),
                api_key,
                config.openai_model.clone(),
                config.temperature,
                timeout,
            )?))
        }
        _ => Ok(Arc::new(ollama::OllamaGenerator::new(
            config.ollama_base_url.clone(),
            config.ollama_model.clone(),
            config.temperature,
            timeout,
        )?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_provider_is_ollama() {
        let generator = create_text_generator(&GenerationConfig::default()).unwrap();
        assert_eq!(generator.model_name(), "llama3.2:3b");
    }

    #[test]
    fn test_openai_requires_key() {
        let config = GenerationConfig {
            provider: "openai".to_string(),
            ..GenerationConfig::default()
        };
        assert!(matches!(
            create_text_generator(&config),
            Err(GenerationError::NotConfigured(_))
        ));
    }

    #[test]
    fn test_timeout_error_message() {
        let err = GenerationError::Timeout(Duration::from_secs(5));
        assert_eq!(err.to_string(), "Generation timed out after 5s");
    }
}
