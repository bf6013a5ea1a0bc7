/// Domain-specific error types for resume-ranker
///
/// Component errors (embedding, generation, extraction) live next to the
/// traits that produce them. This module holds the crate-level error used at
/// the configuration and input boundary, plus the `Degradation` tags attached
/// to scores that were defaulted instead of computed.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, thiserror::Error)]
pub enum RankerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Input error: {message}")]
    Input {
        message: String,
        path: Option<String>,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<crate::embedding::EmbeddingError> for RankerError {
    fn from(e: crate::embedding::EmbeddingError) -> Self {
        RankerError::Internal(e.to_string())
    }
}

impl From<crate::generation::GenerationError> for RankerError {
    fn from(e: crate::generation::GenerationError) -> Self {
        RankerError::Internal(e.to_string())
    }
}

impl RankerError {
    /// Helper to create input errors tied to a file path
    ///
    /// Example:
    /// ```
    /// use resume_ranker::errors::RankerError;
    /// let err = RankerError::input("resumes/jane.json", "File is empty");
    /// ```
    pub fn input(path: &str, message: &str) -> Self {
        RankerError::Input {
            message: message.to_string(),
            path: Some(path.to_string()),
        }
    }
}

/// Why a score was defaulted rather than computed.
///
/// Every failure inside the scoring core is absorbed into a conservative
/// default; the tag (with its human-readable reason) travels with the result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "reason", rename_all = "snake_case")]
pub enum Degradation {
    /// Skill input had an unrecognised shape and was comma-split.
    NormalizationAmbiguity(String),
    /// Embedding backend missing or failing; exact match used instead.
    EmbeddingUnavailable(String),
    /// Generation call failed or timed out.
    ModelTransportError(String),
    /// Rating line or JSON object not found in model output.
    MalformedModelOutput(String),
}

impl fmt::Display for Degradation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Degradation::NormalizationAmbiguity(r) => write!(f, "normalization ambiguity: {}", r),
            Degradation::EmbeddingUnavailable(r) => write!(f, "embedding unavailable: {}", r),
            Degradation::ModelTransportError(r) => write!(f, "model transport error: {}", r),
            Degradation::MalformedModelOutput(r) => write!(f, "malformed model output: {}", r),
        }
    }
}
