/// Weighted fusion of exact and semantic skill scores.
///
/// `final_pct = exact_weight * exact_pct + semantic_weight * semantic_pct`.
/// Both sub-scores are always computed so the explanation stays auditable.

use serde::{Deserialize, Serialize};

use super::exact::{exact_match_pct, skill_coverage};
use super::semantic::SemanticScorer;
use crate::config::ScoringConfig;
use crate::errors::Degradation;

/// Explanation used when the job lists no required skills.
pub const NO_JOB_SKILLS: &str = "No JD skills provided.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillMatchResult {
    /// Share of required skills present verbatim (case-insensitive), 0–100
    pub exact_pct: f64,
    /// Mean best embedding similarity per required skill, 0–100
    pub semantic_pct: f64,
    /// Weighted fusion of the two, 0–100
    pub final_pct: f64,
    pub explanation: String,
    /// Required skills the candidate lists exactly
    #[serde(default)]
    pub matched: Vec<String>,
    /// Required skills with no exact counterpart
    #[serde(default)]
    pub missing: Vec<String>,
    #[serde(default)]
    pub degradations: Vec<Degradation>,
}

impl SkillMatchResult {
    /// Zero score for a job posting that lists no required skills.
    pub fn no_required_skills() -> Self {
        SkillMatchResult {
            exact_pct: 0.0,
            semantic_pct: 0.0,
            final_pct: 0.0,
            explanation: NO_JOB_SKILLS.to_string(),
            matched: Vec::new(),
            missing: Vec::new(),
            degradations: Vec::new(),
        }
    }

    pub fn is_degraded(&self) -> bool {
        !self.degradations.is_empty()
    }
}

/// Fuse two sub-scores with the configured weights.
pub fn fuse(exact_pct: f64, semantic_pct: f64, scoring: &ScoringConfig) -> f64 {
    scoring.exact_weight * exact_pct + scoring.semantic_weight * semantic_pct
}

#[derive(Clone)]
pub struct SkillMatcher {
    semantic: SemanticScorer,
    scoring: ScoringConfig,
}

impl SkillMatcher {
    pub fn new(semantic: SemanticScorer, scoring: ScoringConfig) -> Self {
        SkillMatcher { semantic, scoring }
    }

    /// Score a candidate's skills against the job's required skills.
    ///
    /// With no usable required skills the semantic scorer is never called.
    pub async fn match_skills(&self, required: &[String], candidate: &[String]) -> SkillMatchResult {
        if required.iter().all(|s| s.trim().is_empty()) {
            return SkillMatchResult::no_required_skills();
        }

        let exact_pct = exact_match_pct(required, candidate);
        let semantic = self.semantic.score(candidate, required).await;
        let final_pct = fuse(exact_pct, semantic.pct, &self.scoring);
        let (matched, missing) = skill_coverage(required, candidate);

        let mut explanation = format!(
            "Skills match: {:.2}% (combination of exact and semantic matching)",
            final_pct
        );
        if let Some(reason) = &semantic.degradation {
            explanation.push_str(&format!("; semantic score degraded ({})", reason));
        }

        SkillMatchResult {
            exact_pct,
            semantic_pct: semantic.pct,
            final_pct,
            explanation,
            matched,
            missing,
            degradations: semantic.degradation.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_fuse_uses_configured_weights() {
        let scoring = ScoringConfig::default();
        assert!((fuse(66.67, 95.0, &scoring) - 83.668).abs() < 1e-9);

        let tuned = ScoringConfig {
            exact_weight: 0.5,
            semantic_weight: 0.5,
            ..ScoringConfig::default()
        };
        assert_eq!(fuse(40.0, 60.0, &tuned), 50.0);
    }

    #[test]
    fn test_no_required_skills_result() {
        let result = SkillMatchResult::no_required_skills();
        assert_eq!(result.final_pct, 0.0);
        assert_eq!(result.explanation, "No JD skills provided.");
    }

    #[tokio::test]
    async fn test_without_backend_final_equals_exact() {
        let matcher = SkillMatcher::new(SemanticScorer::unavailable(), ScoringConfig::default());
        let result = matcher
            .match_skills(&strings(&["Rust", "Go"]), &strings(&["rust", "python"]))
            .await;
        assert_eq!(result.exact_pct, 50.0);
        assert_eq!(result.semantic_pct, 50.0);
        assert!((result.final_pct - 50.0).abs() < 1e-9);
        assert!(result.is_degraded());
        assert_eq!(result.matched, vec!["Rust"]);
        assert_eq!(result.missing, vec!["Go"]);
        assert!(result.explanation.starts_with("Skills match: 50.00%"));
    }

    #[tokio::test]
    async fn test_empty_required_skips_semantic() {
        let matcher = SkillMatcher::new(SemanticScorer::unavailable(), ScoringConfig::default());
        for required in [Vec::new(), strings(&["", "  "])] {
            let result = matcher.match_skills(&required, &strings(&["python"])).await;
            assert_eq!(result, SkillMatchResult::no_required_skills());
            // An unavailable backend would have tagged the result had it been consulted
            assert!(!result.is_degraded());
        }
    }
}
