//! Candidate ranking against a job description.
//!
//! Combines a skill-overlap score (exact plus embedding-based) with an
//! experience rating produced by a text generation model, then orders
//! candidates by the weighted aggregate. Every backend failure degrades to a
//! conservative zero with an attached reason instead of aborting the run.

pub mod config;
pub mod embedding;
pub mod errors;
pub mod experience;
pub mod extraction;
pub mod generation;
pub mod input;
pub mod logging;
pub mod parsing;
pub mod profile;
pub mod ranking;
pub mod skills;

use std::sync::Arc;
use std::time::Duration;

use config::Config;
use embedding::EmbeddingProvider;
use experience::ExperienceRater;
use generation::TextGenerator;
use ranking::RankingEngine;
use skills::{SemanticScorer, SkillMatcher};

/// Wire a ranking engine from configuration and already-built backends.
///
/// `embeddings` may be `None`; skill matching then falls back to exact overlap.
pub fn build_engine(
    config: &Config,
    embeddings: Option<Arc<dyn EmbeddingProvider>>,
    generator: Arc<dyn TextGenerator>,
) -> RankingEngine {
    let matcher = SkillMatcher::new(SemanticScorer::from_option(embeddings), config.scoring);
    let rater = ExperienceRater::new(
        generator,
        Duration::from_secs(config.generation.timeout_secs.max(1)),
        config.generation.max_content_chars,
    );
    RankingEngine::new(matcher, rater, config.scoring, config.ranking.max_concurrency)
}
