//! Configuration management for the profile matcher

use crate::engine::aggregate::{BlendWeights, SectionWeights};
use crate::error::{MatcherError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub model: ModelConfig,
    pub scoring: ScoringConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Directory scanned for locally stored embedding models
    pub models_dir: PathBuf,
    /// Model name under `models_dir`, or a HuggingFace repo ID to fetch from
    pub embedding_model: String,
    /// Backoff before the single load retry, in milliseconds
    pub load_retry_backoff_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Semantic/lexical blend applied per section; must sum to 1.0
    pub blend: BlendWeights,
    /// Per-section weights; must sum to 1.0
    pub section_weights: SectionWeights,
    /// Maximum number of attribution entries in a match result
    pub attribution_top_k: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub detailed: bool,
    pub color_output: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Console,
    Json,
    Markdown,
}

impl Default for Config {
    fn default() -> Self {
        let models_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".profile-matcher")
            .join("models");

        Self {
            model: ModelConfig {
                models_dir,
                embedding_model: "minishlab/potion-base-8M".to_string(),
                load_retry_backoff_ms: 500,
            },
            scoring: ScoringConfig {
                blend: BlendWeights::default(),
                section_weights: SectionWeights::default(),
                attribution_top_k: 10,
            },
            output: OutputConfig {
                format: OutputFormat::Console,
                detailed: false,
                color_output: true,
            },
        }
    }
}

impl Config {
    /// Load the configuration, creating the default file on first use.
    /// Weight invariants are checked here: a malformed policy is fatal before
    /// any match request is processed.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        let config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content).map_err(|e| {
                MatcherError::Configuration(format!("Failed to parse config: {}", e))
            })?
        } else {
            let config = Self::default();
            config.save()?;
            config
        };

        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| {
            MatcherError::Configuration(format!("Failed to serialize config: {}", e))
        })?;

        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.scoring.blend.validate()?;
        self.scoring.section_weights.validate()?;

        if self.scoring.attribution_top_k == 0 {
            return Err(MatcherError::Configuration(
                "scoring.attribution_top_k must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("profile-matcher")
            .join("config.toml")
    }

    /// Resolve the embedding model reference: a local directory under
    /// `models_dir` when present, otherwise the configured name is treated as
    /// a HuggingFace repo ID.
    pub fn model_reference(&self) -> PathBuf {
        let local = self.model.models_dir.join(&self.model.embedding_model);
        if local.exists() {
            local
        } else {
            PathBuf::from(&self.model.embedding_model)
        }
    }
}
