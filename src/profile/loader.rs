//! Profile loading from the extractor's JSON contract
//!
//! The engine owns exactly one input format: the `StructuredProfile` JSON
//! shape produced by the external document extractor. Raw document parsing
//! (PDF, free text, ...) is the extractor's concern, not ours.

use crate::error::{MatcherError, Result};
use crate::profile::keywords::KeywordNormalizer;
use crate::profile::model::{SectionContent, StructuredProfile};
use log::debug;
use std::path::Path;

pub fn load_profile(path: &Path) -> Result<StructuredProfile> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        MatcherError::InvalidInput(format!("Cannot read profile {}: {}", path.display(), e))
    })?;
    parse_profile(&content)
}

/// Parse and sanitize a profile: blank spans are dropped (degraded input is
/// recovered, not rejected), and missing per-section keyword sets are derived
/// from the section spans.
pub fn parse_profile(json: &str) -> Result<StructuredProfile> {
    let mut profile: StructuredProfile = serde_json::from_str(json)
        .map_err(|e| MatcherError::InvalidInput(format!("Malformed profile JSON: {}", e)))?;

    for content in profile.sections.values_mut() {
        *content = SectionContent::new(std::mem::take(&mut content.spans));
    }

    let normalizer = KeywordNormalizer::new();
    for (kind, content) in &profile.sections {
        if content.is_empty() {
            continue;
        }
        let missing = profile
            .raw_keywords
            .get(kind)
            .map(|set| set.is_empty())
            .unwrap_or(true);
        if missing {
            debug!("Deriving {} keywords from section spans", kind);
            profile
                .raw_keywords
                .insert(*kind, normalizer.from_spans(&content.spans));
        }
    }

    Ok(profile)
}
