//! Error handling for the profile matcher
//!
//! Degraded input (empty sections, empty keyword sets) is deliberately not an
//! error variant: the engine recovers it locally via the zero-vector sentinel
//! and empty-requirement rules, and flags it on the `MatchResult` instead so
//! callers can tell "genuinely low match" from "could not compute".

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MatcherError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Embedding model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Processing error: {0}")]
    Processing(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MatcherError>;

/// Convert anyhow errors (model2vec surfaces these) to our custom error type
impl From<anyhow::Error> for MatcherError {
    fn from(err: anyhow::Error) -> Self {
        MatcherError::Processing(err.to_string())
    }
}
