/// Ollama text generator
///
/// Calls the Ollama /api/chat endpoint with a single user message and
/// streaming disabled. No API key required.
/// Supports RANKER_GENERATION__OLLAMA_MODEL and RANKER_GENERATION__OLLAMA_BASE_URL.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{GenerationError, TextGenerator, http_client, transport_error};

#[derive(Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: Vec<OllamaMessage<'a>>,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f32,
}

#[derive(Deserialize)]
struct OllamaChatResponse {
    message: OllamaResponseMessage,
}

#[derive(Deserialize)]
struct OllamaResponseMessage {
    content: String,
}

/// Ollama-backed text generator.
pub struct OllamaGenerator {
    client: reqwest::Client,
    base_url: String,
    model: String,
    temperature: f32,
    timeout: Duration,
}

impl OllamaGenerator {
    /// Create a new OllamaGenerator.
    ///
    /// # Arguments
    /// * `base_url` - Ollama server base URL (e.g., "http://localhost:11434")
    /// * `model` - Model name (e.g., "llama3.2:3b")
    /// * `temperature` - Sampling temperature
    /// * `timeout` - Upper bound for one request, enforced by the HTTP client
    pub fn new(
        base_url: String,
        model: String,
        temperature: f32,
        timeout: Duration,
    ) -> Result<Self, GenerationError> {
        Ok(OllamaGenerator {
            client: http_client(timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            temperature,
            timeout,
        })
    }
}

#[async_trait]
impl TextGenerator for OllamaGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let request = OllamaChatRequest {
            model: &self.model,
            messages: vec![OllamaMessage {
                role: "user",
                content: prompt,
            }],
            stream: false,
            options: OllamaOptions {
                temperature: self.temperature,
            },
        };

        let url = format!("{}/api/chat", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| transport_error(e, self.timeout))?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(GenerationError::Api { status, message: body });
        }

        let chat_response: OllamaChatResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::Transport(format!("Failed to parse Ollama response: {}", e)))?;

        if chat_response.message.content.trim().is_empty() {
            return Err(GenerationError::EmptyResponse);
        }

        Ok(chat_response.message.content)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
