//! Requirement keyword gap analysis
//!
//! Pure set arithmetic over normalized keyword sets; needs no embeddings, so
//! gaps are computed even when the match result is otherwise degraded.

use crate::error::{MatcherError, Result};
use aho_corasick::AhoCorasick;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// A requirement keyword absent from the candidate's keyword set, weighted
/// by how much the requirement emphasizes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gap {
    pub keyword: String,
    pub importance: f32,
}

/// `requirement − candidate`, sorted by importance descending then keyword.
/// Importance defaults to requirement-text frequency; a supplied weight map
/// takes precedence for the keywords it covers. An empty result means "no
/// gaps"; gaps are always computed, never skipped, so an empty `Vec` is
/// unambiguous.
pub fn analyze(
    requirement_keywords: &BTreeSet<String>,
    candidate_keywords: &BTreeSet<String>,
    requirement_spans: &[String],
    supplied_importance: Option<&HashMap<String, f32>>,
) -> Result<Vec<Gap>> {
    let missing: Vec<&String> = requirement_keywords
        .difference(candidate_keywords)
        .collect();
    if missing.is_empty() {
        return Ok(Vec::new());
    }

    let frequencies = frequency_importance(&missing, requirement_spans)?;

    let mut gaps: Vec<Gap> = missing
        .iter()
        .zip(frequencies.iter())
        .map(|(keyword, frequency)| {
            let importance = supplied_importance
                .and_then(|map| map.get(keyword.as_str()).copied())
                .unwrap_or(*frequency);
            Gap {
                keyword: (*keyword).clone(),
                importance,
            }
        })
        .collect();

    gaps.sort_by(|a, b| {
        b.importance
            .partial_cmp(&a.importance)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.keyword.cmp(&b.keyword))
    });

    Ok(gaps)
}

/// Case-insensitive occurrence counts over the requirement's span text,
/// normalized by the maximum count so importance lands in (0,1]. Keywords
/// listed but never mentioned in prose count once.
fn frequency_importance(keywords: &[&String], spans: &[String]) -> Result<Vec<f32>> {
    let matcher = AhoCorasick::builder()
        .ascii_case_insensitive(true)
        .build(keywords)
        .map_err(|e| MatcherError::Processing(format!("Failed to build keyword matcher: {}", e)))?;

    let mut counts = vec![1usize; keywords.len()];
    for span in spans {
        for mat in matcher.find_iter(span) {
            counts[mat.pattern().as_usize()] += 1;
        }
    }

    let max = counts.iter().copied().max().unwrap_or(1) as f32;
    Ok(counts.into_iter().map(|c| c as f32 / max).collect())
}
