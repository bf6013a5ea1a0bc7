/// Configuration management using figment
///
/// Loads configuration with this precedence (highest wins):
/// 1. Defaults (hardcoded)
/// 2. TOML file: resume-ranker.toml (in working directory)
/// 3. Environment variables: prefixed RANKER_, nested with `__`
///    (e.g., RANKER_LOG_LEVEL=debug, RANKER_GENERATION__OLLAMA_MODEL=llama3.1:8b)

use figment::{
    Figment,
    providers::{Env, Format, Toml, Serialized},
};
use serde::{Deserialize, Serialize};
use crate::errors::RankerError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Optional file path for log output (in addition to stderr)
    #[serde(default)]
    pub log_file: Option<String>,

    #[serde(default)]
    pub scoring: ScoringConfig,

    #[serde(default)]
    pub embedding: EmbeddingConfig,

    #[serde(default)]
    pub generation: GenerationConfig,

    #[serde(default)]
    pub ranking: RankingConfig,
}

/// Fusion weights. Each pair must sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Weight of the exact-overlap percentage inside the skill score
    #[serde(default = "default_exact_weight")]
    pub exact_weight: f64,

    /// Weight of the embedding best-match percentage inside the skill score
    #[serde(default = "default_semantic_weight")]
    pub semantic_weight: f64,

    /// Weight of the rescaled experience rating in the aggregate
    #[serde(default = "default_experience_weight")]
    pub experience_weight: f64,

    /// Weight of the skill score in the aggregate
    #[serde(default = "default_skill_weight")]
    pub skill_weight: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// "local" (fastembed), "openai", or "none" to force exact-match fallback
    #[serde(default = "default_embedding_provider")]
    pub provider: String,

    /// Directory for cached fastembed model weights
    #[serde(default = "default_cache_dir")]
    pub cache_dir: String,

    #[serde(default)]
    pub openai_api_key: Option<String>,

    #[serde(default = "default_openai_embedding_model")]
    pub openai_model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// "ollama" (default, no API key) or "openai"
    #[serde(default = "default_generation_provider")]
    pub provider: String,

    #[serde(default = "default_ollama_base_url")]
    pub ollama_base_url: String,

    #[serde(default = "default_ollama_model")]
    pub ollama_model: String,

    #[serde(default = "default_openai_base_url")]
    pub openai_base_url: String,

    #[serde(default)]
    pub openai_api_key: Option<String>,

    #[serde(default = "default_openai_model")]
    pub openai_model: String,

    /// Upper bound for a single generation call
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Free text longer than this is truncated before prompting
    #[serde(default = "default_max_content_chars")]
    pub max_content_chars: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingConfig {
    /// Candidates scored at the same time
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// 0 means unlimited
    #[serde(default)]
    pub max_candidates: usize,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_exact_weight() -> f64 {
    0.4
}

fn default_semantic_weight() -> f64 {
    0.6
}

fn default_experience_weight() -> f64 {
    0.4
}

fn default_skill_weight() -> f64 {
    0.6
}

fn default_embedding_provider() -> String {
    "local".to_string()
}

fn default_cache_dir() -> String {
    dirs::cache_dir()
        .map(|d| d.join("resume-ranker").join("models"))
        .unwrap_or_else(|| std::path::PathBuf::from(".fastembed_cache"))
        .to_string_lossy()
        .into_owned()
}

fn default_openai_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_generation_provider() -> String {
    "ollama".to_string()
}

fn default_ollama_base_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_ollama_model() -> String {
    "llama3.2:3b".to_string()
}

fn default_openai_base_url() -> String {
    "https://api.openai.com".to_string()
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_temperature() -> f32 {
    0.2
}

fn default_max_content_chars() -> usize {
    4000
}

fn default_max_concurrency() -> usize {
    4
}

impl Default for ScoringConfig {
    fn default() -> Self {
        ScoringConfig {
            exact_weight: default_exact_weight(),
            semantic_weight: default_semantic_weight(),
            experience_weight: default_experience_weight(),
            skill_weight: default_skill_weight(),
        }
    }
}

impl ScoringConfig {
    /// Reject non-finite or negative weights and pairs that do not sum to 1.0.
    pub fn validate(&self) -> Result<(), RankerError> {
        let pairs = [
            ("exact_weight + semantic_weight", self.exact_weight, self.semantic_weight),
            ("experience_weight + skill_weight", self.experience_weight, self.skill_weight),
        ];
        for (label, a, b) in pairs {
            if !a.is_finite() || !b.is_finite() {
                return Err(RankerError::Config(format!("{} must be finite numbers", label)));
            }
            if a < 0.0 || b < 0.0 {
                return Err(RankerError::Config(format!("{} must not be negative", label)));
            }
            if ((a + b) - 1.0).abs() > 1e-6 {
                return Err(RankerError::Config(format!(
                    "{} must sum to 1.0 (got {})",
                    label,
                    a + b
                )));
            }
        }
        Ok(())
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        EmbeddingConfig {
            provider: default_embedding_provider(),
            cache_dir: default_cache_dir(),
            openai_api_key: None,
            openai_model: default_openai_embedding_model(),
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        GenerationConfig {
            provider: default_generation_provider(),
            ollama_base_url: default_ollama_base_url(),
            ollama_model: default_ollama_model(),
            openai_base_url: default_openai_base_url(),
            openai_api_key: None,
            openai_model: default_openai_model(),
            timeout_secs: default_timeout_secs(),
            temperature: default_temperature(),
            max_content_chars: default_max_content_chars(),
        }
    }
}

impl Default for RankingConfig {
    fn default() -> Self {
        RankingConfig {
            max_concurrency: default_max_concurrency(),
            max_candidates: 0,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            log_level: default_log_level(),
            log_file: None,
            scoring: ScoringConfig::default(),
            embedding: EmbeddingConfig::default(),
            generation: GenerationConfig::default(),
            ranking: RankingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from defaults, TOML file, and environment variables
    ///
    /// Environment variables override TOML file values.
    /// Example: RANKER_SCORING__SKILL_WEIGHT=0.7 overrides scoring.skill_weight
    pub fn load() -> Result<Config, RankerError> {
        Self::from_figment(
            Figment::new()
                .merge(Serialized::defaults(Config::default()))
                .merge(Toml::file("resume-ranker.toml"))
                .merge(Env::prefixed("RANKER_").split("__")),
        )
    }

    fn from_figment(figment: Figment) -> Result<Config, RankerError> {
        let config: Config = figment
            .extract()
            .map_err(|e| RankerError::Config(format!("Failed to load config: {}", e)))?;
        config.scoring.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_file, None);
        assert_eq!(config.scoring.exact_weight, 0.4);
        assert_eq!(config.scoring.skill_weight, 0.6);
        assert_eq!(config.generation.provider, "ollama");
        assert_eq!(config.generation.timeout_secs, 60);
        assert_eq!(config.ranking.max_concurrency, 4);
    }

    #[test]
    fn test_default_weights_validate() {
        assert!(ScoringConfig::default().validate().is_ok());
    }

    #[test]
    fn test_weights_must_sum_to_one() {
        let scoring = ScoringConfig {
            exact_weight: 0.5,
            semantic_weight: 0.6,
            ..ScoringConfig::default()
        };
        assert!(scoring.validate().is_err());
    }

    #[test]
    fn test_nan_weight_rejected() {
        let scoring = ScoringConfig {
            exact_weight: f64::NAN,
            ..ScoringConfig::default()
        };
        assert!(scoring.validate().is_err());

        let scoring = ScoringConfig {
            skill_weight: f64::INFINITY,
            ..ScoringConfig::default()
        };
        assert!(scoring.validate().is_err());
    }

    #[test]
    fn test_negative_weight_rejected() {
        let scoring = ScoringConfig {
            experience_weight: -0.2,
            skill_weight: 1.2,
            ..ScoringConfig::default()
        };
        assert!(scoring.validate().is_err());
    }

    #[test]
    fn test_toml_overrides_nested_sections() {
        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::string(
                "[generation]\nollama_model = \"llama3.1:8b\"\n\
                 [scoring]\nexperience_weight = 0.5\nskill_weight = 0.5\n",
            ));
        let config = Config::from_figment(figment).unwrap();
        assert_eq!(config.generation.ollama_model, "llama3.1:8b");
        assert_eq!(config.scoring.experience_weight, 0.5);
        assert_eq!(config.scoring.exact_weight, 0.4);
    }
}
