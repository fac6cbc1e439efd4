//! Leave-one-phrase-out attribution
//!
//! Explains the aggregate score by ranking candidate phrases by marginal
//! contribution: for each span of the candidate's Skills and Experience
//! sections, the section vector is re-pooled without that span and the
//! section's combined value recomputed with the lexical term held fixed.
//! `Δ = combined_with − combined_without` is the span's contribution. This
//! is an approximation of feature importance, not an exact Shapley value;
//! it is deterministic for fixed input and model.

use crate::engine::aggregate::{ScoringPolicy, SectionScore};
use crate::engine::embedder::{zero_vector, EmbeddingVector};
use crate::engine::similarity;
use crate::error::Result;
use crate::profile::model::SectionKind;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sign {
    /// Removing the phrase would have lowered the score
    Positive,
    /// Removing the phrase would have raised (or not changed) the score
    Negative,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attribution {
    pub phrase: String,
    pub section: SectionKind,
    pub contribution: f32,
    pub sign: Sign,
}

/// One section's masking inputs, reusing the span vectors computed during
/// the scoring pass. Nothing is re-encoded here.
pub struct SectionSpans {
    pub kind: SectionKind,
    pub spans: Vec<String>,
    pub span_vectors: Vec<EmbeddingVector>,
    pub requirement_vector: EmbeddingVector,
}

pub fn attribute(
    policy: &ScoringPolicy,
    sections: &BTreeMap<SectionKind, SectionScore>,
    inputs: &[SectionSpans],
    dimension: usize,
    top_k: usize,
) -> Result<Vec<Attribution>> {
    let mut attributions = Vec::new();

    for input in inputs {
        let Some(score) = sections.get(&input.kind) else {
            continue;
        };
        let span_count = input.span_vectors.len();
        if span_count == 0 {
            continue;
        }

        // Sum once; each mask is (sum - v_i) / (n - 1)
        let mut sum = zero_vector(dimension);
        for vector in &input.span_vectors {
            for (slot, value) in sum.iter_mut().zip(vector.iter()) {
                *slot += value;
            }
        }

        for (span, vector) in input.spans.iter().zip(input.span_vectors.iter()) {
            let masked = if span_count == 1 {
                zero_vector(dimension)
            } else {
                let remaining = (span_count - 1) as f32;
                sum.iter()
                    .zip(vector.iter())
                    .map(|(total, v)| (total - v) / remaining)
                    .collect()
            };

            let masked_semantic = similarity::similarity(&input.requirement_vector, &masked)?;
            let without = policy.blend.combined(masked_semantic, score.lexical);
            let delta = score.combined - without;

            // A zero delta carries no signal; keeping it would only pad the payload
            if delta == 0.0 {
                continue;
            }

            attributions.push(Attribution {
                phrase: span.clone(),
                section: input.kind,
                contribution: delta,
                sign: if delta > 0.0 { Sign::Positive } else { Sign::Negative },
            });
        }
    }

    // Stable sort keeps section order then span order as the tie-break
    attributions.sort_by(|a, b| {
        b.contribution
            .abs()
            .partial_cmp(&a.contribution.abs())
            .unwrap_or(Ordering::Equal)
    });
    attributions.truncate(top_k);

    Ok(attributions)
}
