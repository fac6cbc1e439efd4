//! CLI interface for the profile matcher

use crate::config::OutputFormat;
use crate::engine::aggregate::SectionWeights;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "profile-matcher")]
#[command(about = "Explainable candidate/job-requirement profile matching")]
#[command(
    long_about = "Score a candidate profile against a job requirement profile using section embeddings and keyword overlap, with per-phrase attributions and a keyword gap list"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Match a candidate profile against a requirement profile
    Match {
        /// Path to the candidate profile (JSON)
        #[arg(short, long)]
        candidate: PathBuf,

        /// Path to the requirement profile (JSON)
        #[arg(short, long)]
        requirement: PathBuf,

        /// Section weight overrides, e.g. "skills=0.5,experience=0.3,education=0.1,other=0.1"
        #[arg(short, long)]
        weights: Option<String>,

        /// Output format: console, json, markdown (defaults to the configured format)
        #[arg(short, long)]
        output: Option<String>,

        /// Save the formatted output to a file
        #[arg(short, long)]
        save: Option<PathBuf>,

        /// Include model and timing details in console output
        #[arg(short, long)]
        detailed: bool,
    },

    /// Show or edit configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Reset configuration to defaults
    Reset,
}

/// Parse and validate output format
pub fn parse_output_format(format: &str) -> Result<OutputFormat, String> {
    match format.to_lowercase().as_str() {
        "console" => Ok(OutputFormat::Console),
        "json" => Ok(OutputFormat::Json),
        "markdown" | "md" => Ok(OutputFormat::Markdown),
        _ => Err(format!(
            "Invalid output format: {}. Supported: console, json, markdown",
            format
        )),
    }
}

/// Parse a "skills=0.5,experience=0.3,..." weight override. Unspecified
/// kinds keep their defaults; the sum invariant is enforced later by the
/// engine, before any scoring.
pub fn parse_weights(spec: &str) -> Result<SectionWeights, String> {
    let mut weights = SectionWeights::default();

    for pair in spec.split(',') {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| format!("Invalid weight entry: {}", pair))?;
        let value: f32 = value
            .trim()
            .parse()
            .map_err(|_| format!("Invalid weight value: {}", value))?;

        match key.trim().to_lowercase().as_str() {
            "skills" => weights.skills = value,
            "experience" => weights.experience = value,
            "education" => weights.education = value,
            "other" => weights.other = value,
            unknown => return Err(format!("Unknown section kind: {}", unknown)),
        }
    }

    Ok(weights)
}

/// Validate file extension
pub fn validate_file_extension(path: &Path, allowed_extensions: &[&str]) -> Result<(), String> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => {
            if allowed_extensions.contains(&ext.to_lowercase().as_str()) {
                Ok(())
            } else {
                Err(format!(
                    "Unsupported file extension: .{}. Allowed: {}",
                    ext,
                    allowed_extensions.join(", ")
                ))
            }
        }
        None => Err("File has no extension".to_string()),
    }
}
