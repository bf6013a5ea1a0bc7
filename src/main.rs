use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use resume_ranker::build_engine;
use resume_ranker::config::Config;
use resume_ranker::embedding::{EmbeddingProvider, create_embedding_provider};
use resume_ranker::extraction::LlmProfileExtractor;
use resume_ranker::generation::create_text_generator;
use resume_ranker::input::{load_candidates, load_job};
use resume_ranker::logging;
use resume_ranker::parsing::{conclusion_points, parse_rating};
use resume_ranker::ranking::report::{RankingReport, to_csv, to_table};
use resume_ranker::skills::{SemanticScorer, SkillMatcher, normalize_skills};

#[derive(Parser)]
#[command(name = "resume-ranker", version, about = "Rank candidates against a job description")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score and rank candidates against one job description
    Rank {
        /// Job description: extracted record (.json) or plain text
        #[arg(long)]
        job: PathBuf,

        /// Candidate resumes: extracted records (.json) or plain text
        #[arg(required = true)]
        candidates: Vec<PathBuf>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,

        /// Skip embeddings and score skills by exact overlap only
        #[arg(long)]
        no_embeddings: bool,
    },
    /// Parse a model response and print its rating and conclusion points
    Rating {
        /// File holding the response, or "-" for stdin
        #[arg(default_value = "-")]
        input: String,
    },
    /// Match two comma-separated skill lists and print the result as JSON
    Skills {
        #[arg(long)]
        required: String,

        #[arg(long)]
        candidate: String,

        #[arg(long)]
        no_embeddings: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Csv,
    Json,
}

/// Create the embedding provider, or run without one if it cannot be loaded.
async fn embeddings_or_none(config: &Config, disabled: bool) -> Option<Arc<dyn EmbeddingProvider>> {
    if disabled {
        tracing::info!("Embeddings disabled via --no-embeddings");
        return None;
    }
    match create_embedding_provider(&config.embedding).await {
        Ok(Some(provider)) => {
            tracing::info!(model = provider.model_name(), "Embedding provider ready");
            Some(provider)
        }
        Ok(None) => {
            tracing::info!("Embeddings disabled via config (embedding.provider=none)");
            None
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to initialize embedding provider, using exact skill match only");
            None
        }
    }
}

async fn run_rank(
    config: &Config,
    job_path: &Path,
    candidate_paths: &[PathBuf],
    format: OutputFormat,
    no_embeddings: bool,
) -> Result<()> {
    let generator = create_text_generator(&config.generation)?;
    let extractor = LlmProfileExtractor::new(generator.clone(), config.generation.max_content_chars);

    let job = load_job(job_path, &extractor).await?;
    tracing::info!(
        title = job.title.as_deref().unwrap_or("untitled"),
        skills = job.required_skills.len(),
        "Job description loaded"
    );

    let mut paths = candidate_paths.to_vec();
    if config.ranking.max_candidates > 0 && paths.len() > config.ranking.max_candidates {
        tracing::warn!(
            given = paths.len(),
            limit = config.ranking.max_candidates,
            "Too many candidates, extra files ignored"
        );
        paths.truncate(config.ranking.max_candidates);
    }

    let candidates = load_candidates(&paths, &extractor).await;
    if candidates.is_empty() {
        anyhow::bail!("No valid candidates to rank");
    }

    let embeddings = embeddings_or_none(config, no_embeddings).await;

    let pb = ProgressBar::new(candidates.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{pos}/{len}] {msg} [{elapsed_precise} / {eta_precise}]")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    let progress = pb.clone();
    let engine = build_engine(config, embeddings, generator).with_progress(move |result| {
        progress.set_message(result.candidate_name.clone());
        progress.inc(1);
    });

    let outcome = engine
        .rank_until(&job, candidates, async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await;
    pb.finish_and_clear();

    if outcome.cancelled {
        tracing::warn!(unfinished = ?outcome.unfinished, "Interrupted, showing completed candidates only");
    }

    match format {
        OutputFormat::Table => print!("{}", to_table(&outcome.results)),
        OutputFormat::Csv => print!("{}", to_csv(&outcome.results)),
        OutputFormat::Json => {
            let report = RankingReport::new(job.title.clone(), outcome.results, outcome.cancelled);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

fn run_rating(input: &str) -> Result<()> {
    let text = if input == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(input).with_context(|| format!("Failed to read {}", input))?
    };

    let parsed = parse_rating(&text);
    println!("Rating: {}/10", parsed.rating);
    if let Some(reason) = parsed.degradation {
        println!("Warning: {}", reason);
    }
    for point in conclusion_points(&text) {
        println!("- {}", point);
    }
    Ok(())
}

async fn run_skills(config: &Config, required: &str, candidate: &str, no_embeddings: bool) -> Result<()> {
    let required = normalize_skills(Some(&serde_json::Value::String(required.to_string()))).skills;
    let candidate = normalize_skills(Some(&serde_json::Value::String(candidate.to_string()))).skills;

    let embeddings = embeddings_or_none(config, no_embeddings).await;
    let matcher = SkillMatcher::new(SemanticScorer::from_option(embeddings), config.scoring);
    let result = matcher.match_skills(&required, &candidate).await;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Parse CLI args
    let cli = Cli::parse();

    // 2. Load configuration
    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("Config error (using defaults): {}", e);
        Config::default()
    });

    // 3. Initialize logging FIRST: stderr only, stdout carries the report
    logging::init_logging(&config);

    match cli.command {
        Commands::Rank {
            job,
            candidates,
            format,
            no_embeddings,
        } => run_rank(&config, &job, &candidates, format, no_embeddings).await,
        Commands::Rating { input } => run_rating(&input),
        Commands::Skills {
            required,
            candidate,
            no_embeddings,
        } => run_skills(&config, &required, &candidate, no_embeddings).await,
    }
}
