//! Profile matcher: explainable candidate/job-requirement compatibility scoring

use clap::Parser;
use log::{error, info};
use profile_matcher::cli::{self, Cli, Commands, ConfigAction};
use profile_matcher::config::Config;
use profile_matcher::engine::matcher::{MatchEngine, MatchRequest};
use profile_matcher::error::{MatcherError, Result};
use profile_matcher::output::ReportGenerator;
use profile_matcher::profile::loader;
use std::process;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run_command(cli.command, config).await {
        error!("Command failed: {}", e);
        process::exit(1);
    }
}

async fn run_command(command: Commands, config: Config) -> Result<()> {
    match command {
        Commands::Match {
            candidate,
            requirement,
            weights,
            output,
            save,
            detailed,
        } => {
            cli::validate_file_extension(&candidate, &["json"])
                .map_err(|e| MatcherError::InvalidInput(format!("Candidate profile: {}", e)))?;
            cli::validate_file_extension(&requirement, &["json"])
                .map_err(|e| MatcherError::InvalidInput(format!("Requirement profile: {}", e)))?;

            let output_format = match output {
                Some(format) => {
                    cli::parse_output_format(&format).map_err(MatcherError::InvalidInput)?
                }
                None => config.output.format.clone(),
            };
            let weights = weights
                .map(|spec| cli::parse_weights(&spec))
                .transpose()
                .map_err(MatcherError::InvalidInput)?;

            info!("Loading profiles");
            let candidate = loader::load_profile(&candidate)?;
            let requirement = loader::load_profile(&requirement)?;

            let engine = MatchEngine::from_config(&config).await?;
            let request = MatchRequest {
                candidate,
                requirement,
                weights,
            };

            let result = engine.match_profiles(&request)?;

            let mut output_config = config.output.clone();
            output_config.detailed = output_config.detailed || detailed;
            let formatted = ReportGenerator::format(&output_format, &output_config, &result)?;

            match save {
                Some(path) => {
                    std::fs::write(&path, &formatted)?;
                    println!("Report saved to {}", path.display());
                }
                None => println!("{}", formatted),
            }

            Ok(())
        }

        Commands::Config { action } => match action.unwrap_or(ConfigAction::Show) {
            ConfigAction::Show => {
                let content = toml::to_string_pretty(&config).map_err(|e| {
                    MatcherError::Configuration(format!("Failed to serialize config: {}", e))
                })?;
                println!("{}", content);
                Ok(())
            }
            ConfigAction::Reset => {
                let config = Config::default();
                config.save()?;
                println!("Configuration reset to defaults");
                Ok(())
            }
        },
    }
}
