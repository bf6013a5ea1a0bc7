/// OpenAI-compatible text generator
///
/// Calls a Chat Completions endpoint (`{base_url}/v1/chat/completions`).
/// Uses gpt-4o-mini by default; requires RANKER_GENERATION__OPENAI_API_KEY.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{GenerationError, TextGenerator, http_client, transport_error};

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI-backed text generator.
pub struct OpenAIGenerator {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    timeout: Duration,
}

impl OpenAIGenerator {
    /// Create a new OpenAIGenerator.
    ///
    /// # Errors
    /// Returns `GenerationError::NotConfigured` if api_key is empty.
    pub fn new(
        base_url: String,
        api_key: String,
        model: String,
        temperature: f32,
        timeout: Duration,
    ) -> Result<Self, GenerationError> {
        if api_key.trim().is_empty() {
            return Err(GenerationError::NotConfigured(
                "OpenAI API key is required when using the openai generation provider. \
                 Set RANKER_GENERATION__OPENAI_API_KEY in the environment"
                    .to_string(),
            ));
        }

        Ok(OpenAIGenerator {
            client: http_client(timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
            temperature,
            timeout,
        })
    }
}

#[async_trait]
impl TextGenerator for OpenAIGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.temperature,
        };

        let url = format!("{}/v1/chat/completions", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
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

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::Transport(format!("Failed to parse OpenAI response: {}", e)))?;

        chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(GenerationError::EmptyResponse)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
