//! Aggregate ranking of candidates against one job.
//!
//! Each candidate is scored independently (skill match plus model-rated
//! experience) in its own task, bounded by a semaphore. Results are sorted
//! only after every task has finished: a plain fan-out/fan-in barrier with no
//! shared mutable state.

pub mod report;

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::Instrument;

use crate::config::ScoringConfig;
use crate::errors::Degradation;
use crate::experience::{ExperienceRater, ExperienceRating};
use crate::profile::{CandidateProfile, JobProfile};
use crate::skills::{SkillMatchResult, SkillMatcher};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AggregateScore {
    /// Experience rating rescaled to 0–100
    pub experience_component: f64,
    /// Final skill match percentage, 0–100
    pub skill_component: f64,
    /// Weighted fusion of both components, 0–100
    pub total: f64,
}

impl AggregateScore {
    pub fn compute(rating: u8, skill_pct: f64, scoring: &ScoringConfig) -> Self {
        let experience_component = rating as f64 * 10.0;
        AggregateScore {
            experience_component,
            skill_component: skill_pct,
            total: scoring.experience_weight * experience_component + scoring.skill_weight * skill_pct,
        }
    }
}

/// One candidate's scores. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingResult {
    pub candidate_name: String,
    pub experience_rating: ExperienceRating,
    pub skill_match: SkillMatchResult,
    pub aggregate: AggregateScore,
    /// Every fallback taken while scoring this candidate, in pipeline order
    #[serde(default)]
    pub degradations: Vec<Degradation>,
}

impl RankingResult {
    pub fn is_degraded(&self) -> bool {
        !self.degradations.is_empty()
    }
}

/// Results of a run that may have been cancelled part way.
#[derive(Debug, Clone, Default)]
pub struct RankingOutcome {
    /// Completed results, highest total first
    pub results: Vec<RankingResult>,
    /// True when the cancel signal fired before every candidate finished
    pub cancelled: bool,
    /// Candidates that produced no result (cancelled or crashed)
    pub unfinished: Vec<String>,
}

type ProgressFn = dyn Fn(&RankingResult) + Send + Sync;

#[derive(Clone)]
pub struct RankingEngine {
    skills: SkillMatcher,
    rater: ExperienceRater,
    scoring: ScoringConfig,
    max_concurrency: usize,
    progress: Option<Arc<ProgressFn>>,
}

impl RankingEngine {
    pub fn new(
        skills: SkillMatcher,
        rater: ExperienceRater,
        scoring: ScoringConfig,
        max_concurrency: usize,
    ) -> Self {
        RankingEngine {
            skills,
            rater,
            scoring,
            max_concurrency: max_concurrency.max(1),
            progress: None,
        }
    }

    /// Call `f` each time a candidate finishes, in completion order.
    pub fn with_progress(mut self, f: impl Fn(&RankingResult) + Send + Sync + 'static) -> Self {
        self.progress = Some(Arc::new(f));
        self
    }

    /// Score a single candidate. Never fails; fallbacks are recorded on the result.
    pub async fn score_candidate(&self, job: &JobProfile, candidate: &CandidateProfile) -> RankingResult {
        let skill_match = self.skills.match_skills(&job.required_skills, &candidate.skills).await;

        let experience_rating = self
            .rater
            .rate(&candidate.experience, &job.required_experience)
            .await;

        let aggregate = AggregateScore::compute(experience_rating.rating, skill_match.final_pct, &self.scoring);

        let degradations = job
            .degradations
            .iter()
            .chain(&candidate.degradations)
            .chain(&skill_match.degradations)
            .chain(&experience_rating.degradations)
            .cloned()
            .collect();

        tracing::debug!(
            experience = aggregate.experience_component,
            skills = aggregate.skill_component,
            total = aggregate.total,
            "Candidate scored"
        );

        RankingResult {
            candidate_name: candidate.name.clone(),
            experience_rating,
            skill_match,
            aggregate,
            degradations,
        }
    }

    /// Score every candidate and return them sorted by total, highest first.
    ///
    /// Equal totals keep their input order.
    pub async fn rank(&self, job: &JobProfile, candidates: Vec<CandidateProfile>) -> Vec<RankingResult> {
        self.rank_until(job, candidates, std::future::pending()).await.results
    }

    /// Like [`rank`](Self::rank), but stops when `cancel` resolves.
    ///
    /// In-flight candidates are aborted; those already finished are kept.
    pub async fn rank_until<F>(
        &self,
        job: &JobProfile,
        candidates: Vec<CandidateProfile>,
        cancel: F,
    ) -> RankingOutcome
    where
        F: Future<Output = ()>,
    {
        let run_id = uuid::Uuid::new_v4();
        let span = tracing::info_span!("ranking_run", run_id = %run_id, candidates = candidates.len());

        async move {
            let job = Arc::new(job.clone());
            let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
            let names: Vec<String> = candidates.iter().map(|c| c.name.clone()).collect();
            let mut slots: Vec<Option<RankingResult>> = vec![None; candidates.len()];
            let mut set = JoinSet::new();

            for (idx, candidate) in candidates.into_iter().enumerate() {
                let engine = self.clone();
                let job = Arc::clone(&job);
                let semaphore = Arc::clone(&semaphore);
                let span = tracing::info_span!("candidate", name = %candidate.name);
                set.spawn(
                    async move {
                        let _permit = semaphore.acquire_owned().await.ok();
                        (idx, engine.score_candidate(&job, &candidate).await)
                    }
                    .instrument(span),
                );
            }

            tokio::pin!(cancel);
            let mut cancelled = false;

            loop {
                tokio::select! {
                    biased;
                    _ = &mut cancel, if !cancelled => {
                        tracing::warn!(remaining = set.len(), "Ranking cancelled, aborting unfinished candidates");
                        cancelled = true;
                        set.abort_all();
                    }
                    joined = set.join_next() => match joined {
                        None => break,
                        Some(Ok((idx, result))) => {
                            if let Some(progress) = &self.progress {
                                progress(&result);
                            }
                            slots[idx] = Some(result);
                        }
                        Some(Err(e)) if e.is_cancelled() => {}
                        Some(Err(e)) => {
                            tracing::error!(error = %e, "Candidate scoring task failed");
                        }
                    }
                }
            }

            let unfinished: Vec<String> = slots
                .iter()
                .zip(&names)
                .filter(|(slot, _)| slot.is_none())
                .map(|(_, name)| name.clone())
                .collect();

            let mut results: Vec<RankingResult> = slots.into_iter().flatten().collect();
            sort_by_total(&mut results);

            tracing::info!(
                ranked = results.len(),
                unfinished = unfinished.len(),
                cancelled,
                "Ranking complete"
            );

            RankingOutcome {
                results,
                cancelled,
                unfinished,
            }
        }
        .instrument(span)
        .await
    }
}

/// Stable sort, highest total first.
pub fn sort_by_total(results: &mut [RankingResult]) {
    results.sort_by(|a, b| b.aggregate.total.total_cmp(&a.aggregate.total));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(name: &str, total: f64) -> RankingResult {
        RankingResult {
            candidate_name: name.to_string(),
            experience_rating: ExperienceRating::from_response("Rating: 0/10".to_string()),
            skill_match: SkillMatchResult::no_required_skills(),
            aggregate: AggregateScore {
                experience_component: 0.0,
                skill_component: 0.0,
                total,
            },
            degradations: Vec::new(),
        }
    }

    #[test]
    fn test_aggregate_rescales_rating() {
        let score = AggregateScore::compute(7, 83.67, &ScoringConfig::default());
        assert_eq!(score.experience_component, 70.0);
        assert!((score.total - (0.4 * 70.0 + 0.6 * 83.67)).abs() < 1e-9);
    }

    #[test]
    fn test_aggregate_bounds() {
        let scoring = ScoringConfig::default();
        assert_eq!(AggregateScore::compute(0, 0.0, &scoring).total, 0.0);
        assert!((AggregateScore::compute(10, 100.0, &scoring).total - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_sort_descending_and_stable() {
        let mut results = vec![
            result("a", 40.0),
            result("b", 83.67),
            result("c", 40.0),
            result("d", 0.0),
        ];
        sort_by_total(&mut results);
        let names: Vec<&str> = results.iter().map(|r| r.candidate_name.as_str()).collect();
        assert_eq!(names, vec!["b", "a", "c", "d"]);
    }
}
