/// Structured field extraction from resume and job description text.
///
/// Provides a pluggable interface that turns plain text into the loosely
/// shaped records consumed by `profile`. The bundled implementation prompts a
/// `TextGenerator` for JSON and pulls the first balanced object out of the
/// answer, since local models often wrap JSON in prose or code fences.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

use crate::errors::RankerError;
use crate::generation::{GenerationError, TextGenerator};
use crate::parsing::try_extract_json;

/// Errors that can occur during extraction operations.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// Backend call failed
    #[error("Extraction generation error: {0}")]
    Generation(#[from] GenerationError),

    /// Model answered without a usable JSON object
    #[error("Malformed extraction output: {reason} (content: {content})")]
    MalformedOutput { reason: String, content: String },

    /// Nothing to extract from
    #[error("Input text is empty")]
    EmptyInput,
}

impl From<ExtractionError> for RankerError {
    fn from(e: ExtractionError) -> Self {
        RankerError::Internal(e.to_string())
    }
}

/// Build the resume extraction prompt.
pub fn build_resume_prompt(text: &str) -> String {
    format!(
        "Extract structured data from the resume below.\n\
         Respond with a single JSON object and nothing else, using exactly these keys:\n\
         {{\"name\": string, \
           \"Technical Skills\": [string], \
           \"Soft Skills\": [string], \
           \"Experience\": [{{\"Position\": string, \"Company\": string, \"Location\": string, \
             \"Start_Date\": string, \"End_Date\": string}}]}}\n\
         Copy names and skills verbatim. Use an empty list when a section is missing.\n\n\
         Resume:\n{}",
        text
    )
}

/// Build the job description extraction prompt.
pub fn build_job_prompt(text: &str) -> String {
    format!(
        "Extract structured data from the job description below.\n\
         Respond with a single JSON object and nothing else, using exactly these keys:\n\
         {{\"Job Title\": string, \"Experience Required\": string, \"Skills Required\": [string]}}\n\
         List every required skill as a short phrase. Use an empty list when none are stated.\n\n\
         Job Description:\n{}",
        text
    )
}

/// Core trait for turning document text into a structured record.
///
/// Implementations must be Send + Sync to support use in async contexts
/// and across thread boundaries (e.g., Arc<dyn ProfileExtractor>).
#[async_trait]
pub trait ProfileExtractor: Send + Sync {
    /// Extract a resume record (name, skills, experience entries).
    async fn extract_candidate(&self, text: &str) -> Result<Value, ExtractionError>;

    /// Extract a job record (title, required experience, required skills).
    async fn extract_job(&self, text: &str) -> Result<Value, ExtractionError>;
}

/// Extractor backed by a text generation model.
pub struct LlmProfileExtractor {
    generator: Arc<dyn TextGenerator>,
    max_content_chars: usize,
}

impl LlmProfileExtractor {
    /// * `max_content_chars` - Document text beyond this is truncated (0 = no limit)
    pub fn new(generator: Arc<dyn TextGenerator>, max_content_chars: usize) -> Self {
        LlmProfileExtractor {
            generator,
            max_content_chars,
        }
    }

    async fn run(&self, text: &str, build: fn(&str) -> String) -> Result<Value, ExtractionError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ExtractionError::EmptyInput);
        }

        let truncated = match text.char_indices().nth(self.max_content_chars) {
            Some((idx, _)) if self.max_content_chars > 0 => {
                tracing::warn!(
                    original_len = text.len(),
                    truncated_to = self.max_content_chars,
                    "Content truncated for extraction"
                );
                &text[..idx]
            }
            _ => text,
        };

        let content = self.generator.generate(&build(truncated)).await?;

        let record = try_extract_json(&content).map_err(|e| ExtractionError::MalformedOutput {
            reason: e.to_string(),
            content: content.clone(),
        })?;

        if !record.is_object() {
            return Err(ExtractionError::MalformedOutput {
                reason: "expected a JSON object".to_string(),
                content,
            });
        }

        Ok(record)
    }
}

#[async_trait]
impl ProfileExtractor for LlmProfileExtractor {
    async fn extract_candidate(&self, text: &str) -> Result<Value, ExtractionError> {
        self.run(text, build_resume_prompt).await
    }

    async fn extract_job(&self, text: &str) -> Result<Value, ExtractionError> {
        self.run(text, build_job_prompt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct CannedGenerator(String);

    #[async_trait]
    impl TextGenerator for CannedGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
            Ok(self.0.clone())
        }

        fn model_name(&self) -> &str {
            "canned"
        }
    }

    fn extractor(reply: &str) -> LlmProfileExtractor {
        LlmProfileExtractor::new(Arc::new(CannedGenerator(reply.to_string())), 100)
    }

    #[tokio::test]
    async fn test_json_wrapped_in_prose() {
        let reply = "Sure! Here is the data:\n```json\n{\"Job Title\": \"SRE\", \"Skills Required\": [\"Linux\"]}\n```";
        let record = extractor(reply).extract_job("We need an SRE").await.unwrap();
        assert_eq!(record, json!({"Job Title": "SRE", "Skills Required": ["Linux"]}));
    }

    #[tokio::test]
    async fn test_no_json_is_malformed() {
        let err = extractor("I cannot help with that").extract_candidate("resume text").await.unwrap_err();
        assert!(matches!(err, ExtractionError::MalformedOutput { .. }));
    }

    #[tokio::test]
    async fn test_empty_input_rejected() {
        let err = extractor("{}").extract_candidate("   ").await.unwrap_err();
        assert!(matches!(err, ExtractionError::EmptyInput));
    }

    #[test]
    fn test_prompts_name_expected_keys() {
        assert!(build_resume_prompt("x").contains("\"Technical Skills\""));
        assert!(build_job_prompt("x").contains("\"Skills Required\""));
    }
}
