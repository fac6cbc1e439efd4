//! Profile matcher library

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod output;
pub mod profile;

pub use config::Config;
pub use engine::matcher::{MatchEngine, MatchRequest, MatchResult};
pub use error::{MatcherError, Result};
