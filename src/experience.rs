/// Experience rating via the text generation backend.
///
/// One prompt per candidate, no automatic retry. Transport failures and
/// timeouts become a synthetic `Error calling model: ...` text, which the
/// rating parser turns into 0, so a failed call never aborts a ranking run.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::errors::Degradation;
use crate::generation::{GenerationError, TextGenerator};
use crate::parsing::{conclusion_points, parse_rating};

/// Prefix of the synthetic response produced when the model call fails.
pub const MODEL_ERROR_PREFIX: &str = "Error calling model:";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperienceRating {
    /// The model's answer verbatim, or the synthetic error text
    pub raw_text: String,
    /// 0–10, parsed from `raw_text`
    pub rating: u8,
    #[serde(default)]
    pub degradations: Vec<Degradation>,
}

impl ExperienceRating {
    /// Parse a model response (or synthetic error text) into a rating.
    pub fn from_response(raw_text: String) -> Self {
        let parsed = parse_rating(&raw_text);
        ExperienceRating {
            rating: parsed.rating,
            degradations: parsed.degradation.into_iter().collect(),
            raw_text,
        }
    }

    /// Rating rescaled to a 0–100 percentage.
    pub fn pct(&self) -> f64 {
        self.rating as f64 * 10.0
    }

    /// Bullet points from the `Conclusion:` section.
    pub fn conclusion(&self) -> Vec<String> {
        conclusion_points(&self.raw_text)
    }

    pub fn is_degraded(&self) -> bool {
        !self.degradations.is_empty()
    }
}

/// Build the experience comparison prompt.
///
/// The response format here and the rating parser must stay in lockstep.
pub fn build_experience_prompt(candidate_experience: &str, required_experience: &str) -> String {
    format!(
        "You are a hiring assistant. Based on the candidate's experience \
         and the job description's experience requirement, give a score out of 10 for job fit \
         based on experience alone. Also, provide a short explanation of why this experience \
         match score is given.\n\n\
         Format your answer strictly as:\n\
         Experience Rating: <number>/10\n\
         Conclusion: <5 crisp factual bullet points, OR 1-2 short sentences covering exactly 5 key facts>\n\n\
         Resume Experience: {candidate_experience}\n\n\
         Job Experience Required: {required_experience}"
    )
}

/// Asks the text generator to rate a candidate's experience against a job.
#[derive(Clone)]
pub struct ExperienceRater {
    generator: Arc<dyn TextGenerator>,
    timeout: Duration,
    max_content_chars: usize,
}

impl ExperienceRater {
    /// * `timeout` - Upper bound for the whole call; expiry counts as a transport error
    /// * `max_content_chars` - Longer experience texts are truncated before prompting
    pub fn new(generator: Arc<dyn TextGenerator>, timeout: Duration, max_content_chars: usize) -> Self {
        ExperienceRater {
            generator,
            timeout,
            max_content_chars,
        }
    }

    /// Return the raw model text, or `Error calling model: <message>` on failure.
    pub async fn request(&self, candidate_experience: &str, required_experience: &str) -> Result<String, GenerationError> {
        let prompt = build_experience_prompt(
            truncate_chars(candidate_experience, self.max_content_chars),
            truncate_chars(required_experience, self.max_content_chars),
        );

        match tokio::time::timeout(self.timeout, self.generator.generate(&prompt)).await {
            Ok(result) => result,
            Err(_) => Err(GenerationError::Timeout(self.timeout)),
        }
    }

    /// Rate one candidate. Never fails.
    pub async fn rate(&self, candidate_experience: &str, required_experience: &str) -> ExperienceRating {
        match self.request(candidate_experience, required_experience).await {
            Ok(text) => {
                let rating = ExperienceRating::from_response(text);
                if rating.is_degraded() {
                    tracing::warn!(
                        model = self.generator.model_name(),
                        "Model response had no usable rating line, defaulting to 0"
                    );
                }
                rating
            }
            Err(e) => {
                tracing::warn!(
                    model = self.generator.model_name(),
                    error = %e,
                    "Experience rating call failed"
                );
                let mut rating = ExperienceRating::from_response(format!("{} {}", MODEL_ERROR_PREFIX, e));
                rating
                    .degradations
                    .insert(0, Degradation::ModelTransportError(e.to_string()));
                rating
            }
        }
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    if max_chars == 0 {
        return text;
    }
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => {
            tracing::debug!(original_len = text.len(), truncated_to = max_chars, "Experience text truncated");
            &text[..idx]
        }
        None => text,
    }
}
