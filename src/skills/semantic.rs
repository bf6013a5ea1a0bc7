/// Embedding-based skill matching.
///
/// For every required skill, the most similar candidate skill (cosine
/// similarity) is found; the score is the mean of those best similarities
/// as a percentage. Near-synonyms ("ML" vs "Machine Learning") score well
/// here even though they never match exactly.
///
/// The backend is injected. When it is absent or fails, the exact-match
/// percentage is returned together with an `EmbeddingUnavailable` tag.

use std::collections::HashSet;
use std::sync::Arc;

use super::exact::exact_match_pct;
use crate::embedding::{EmbeddingProvider, cosine_similarity};
use crate::errors::Degradation;

/// Semantic percentage plus the reason it was not computed from embeddings, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct SemanticScore {
    pub pct: f64,
    pub degradation: Option<Degradation>,
}

#[derive(Clone)]
pub struct SemanticScorer {
    backend: Option<Arc<dyn EmbeddingProvider>>,
}

impl SemanticScorer {
    pub fn new(backend: Arc<dyn EmbeddingProvider>) -> Self {
        SemanticScorer { backend: Some(backend) }
    }

    /// A scorer with no embedding backend; always falls back to exact matching.
    pub fn unavailable() -> Self {
        SemanticScorer { backend: None }
    }

    pub fn from_option(backend: Option<Arc<dyn EmbeddingProvider>>) -> Self {
        SemanticScorer { backend }
    }

    pub fn is_available(&self) -> bool {
        self.backend.is_some()
    }

    /// Score `candidate` skills against `required` skills. Never fails.
    pub async fn score(&self, candidate: &[String], required: &[String]) -> SemanticScore {
        let candidate = distinct(candidate);
        let required = distinct(required);
        if candidate.is_empty() || required.is_empty() {
            return SemanticScore { pct: 0.0, degradation: None };
        }
        let (candidate, required) = (candidate.as_slice(), required.as_slice());

        let Some(backend) = &self.backend else {
            return fallback(candidate, required, "no embedding backend configured".to_string());
        };

        let required_vecs = match backend.embed_batch(required).await {
            Ok(v) => v,
            Err(e) => return fallback(candidate, required, e.to_string()),
        };
        let candidate_vecs = match backend.embed_batch(candidate).await {
            Ok(v) => v,
            Err(e) => return fallback(candidate, required, e.to_string()),
        };

        let best = best_similarities(&required_vecs, &candidate_vecs);
        tracing::trace!(model = backend.model_name(), best = ?best, "Per-skill best similarities");

        SemanticScore {
            pct: mean_pct(&best),
            degradation: None,
        }
    }
}

/// Highest similarity to any candidate vector, for each required vector.
pub fn best_similarities(required: &[Vec<f32>], candidate: &[Vec<f32>]) -> Vec<f64> {
    required
        .iter()
        .map(|r| {
            candidate
                .iter()
                .map(|c| cosine_similarity(r, c))
                .fold(f64::NEG_INFINITY, f64::max)
        })
        .filter(|s| s.is_finite())
        .collect()
}

/// Mean of `best` scaled to a percentage and clamped to [0, 100].
pub fn mean_pct(best: &[f64]) -> f64 {
    if best.is_empty() {
        return 0.0;
    }
    let mean = best.iter().sum::<f64>() / best.len() as f64;
    (mean * 100.0).clamp(0.0, 100.0)
}

/// Trimmed, non-empty skills with case-insensitive duplicates dropped, first spelling kept.
fn distinct(skills: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    skills
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty() && seen.insert(s.to_lowercase()))
        .map(str::to_string)
        .collect()
}

fn fallback(candidate: &[String], required: &[String], reason: String) -> SemanticScore {
    tracing::warn!(reason = %reason, "Embedding backend unavailable, using exact match");
    SemanticScore {
        pct: exact_match_pct(required, candidate),
        degradation: Some(Degradation::EmbeddingUnavailable(reason)),
    }
}
