//! Weighted aggregation of per-section scores into one bounded value

use crate::error::{MatcherError, Result};
use crate::profile::model::SectionKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const WEIGHT_SUM_TOLERANCE: f32 = 1e-4;

/// Semantic/lexical blend applied to every section. Semantic similarity is
/// the primary signal; the lexical term corrects for domain-specific terms
/// that embeddings under-weight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlendWeights {
    pub semantic: f32,
    pub lexical: f32,
}

impl Default for BlendWeights {
    fn default() -> Self {
        Self {
            semantic: 0.6,
            lexical: 0.4,
        }
    }
}

impl BlendWeights {
    pub fn validate(&self) -> Result<()> {
        validate_weight_sum(
            "blend weights",
            &[("semantic", self.semantic), ("lexical", self.lexical)],
        )
    }

    pub fn combined(&self, semantic: f32, lexical: f32) -> f32 {
        self.semantic * semantic + self.lexical * lexical
    }
}

/// Per-section weights over the closed `SectionKind` set; must sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SectionWeights {
    pub skills: f32,
    pub experience: f32,
    pub education: f32,
    pub other: f32,
}

impl Default for SectionWeights {
    fn default() -> Self {
        Self {
            skills: 0.40,
            experience: 0.30,
            education: 0.15,
            other: 0.15,
        }
    }
}

impl SectionWeights {
    pub fn get(&self, kind: SectionKind) -> f32 {
        match kind {
            SectionKind::Skills => self.skills,
            SectionKind::Experience => self.experience,
            SectionKind::Education => self.education,
            SectionKind::Other => self.other,
        }
    }

    pub fn sum(&self) -> f32 {
        self.skills + self.experience + self.education + self.other
    }

    pub fn validate(&self) -> Result<()> {
        validate_weight_sum(
            "section weights",
            &[
                ("skills", self.skills),
                ("experience", self.experience),
                ("education", self.education),
                ("other", self.other),
            ],
        )
    }
}

fn validate_weight_sum(label: &str, weights: &[(&str, f32)]) -> Result<()> {
    for (name, weight) in weights {
        if !(0.0..=1.0).contains(weight) || !weight.is_finite() {
            return Err(MatcherError::Configuration(format!(
                "{}: {} = {} is outside [0, 1]",
                label, name, weight
            )));
        }
    }

    let sum: f32 = weights.iter().map(|(_, w)| w).sum();
    if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        return Err(MatcherError::Configuration(format!(
            "{} must sum to 1.0, got {}",
            label, sum
        )));
    }

    Ok(())
}

/// Flag distinguishing a genuinely scored section from one whose numbers
/// came out of a recovery path. Callers must be able to tell "low match"
/// from "could not compute".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionStatus {
    /// Both sides had content and the model was available
    Scored,
    /// A zero-vector sentinel drove the semantic term (one side had no spans)
    MissingContent,
    /// The embedding model could not be used; only the lexical term is real
    Unavailable,
}

/// Score of one section: bounded semantic and lexical terms, the section's
/// weight under the active policy, and the blended value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SectionScore {
    pub semantic: f32,
    pub lexical: f32,
    pub weight: f32,
    pub combined: f32,
    pub status: SectionStatus,
}

/// Validated scoring policy: blend ratio plus section weights.
#[derive(Debug, Clone)]
pub struct ScoringPolicy {
    pub blend: BlendWeights,
    pub sections: SectionWeights,
}

impl ScoringPolicy {
    pub fn new(blend: BlendWeights, sections: SectionWeights) -> Result<Self> {
        blend.validate()?;
        sections.validate()?;
        Ok(Self { blend, sections })
    }

    pub fn score_section(
        &self,
        kind: SectionKind,
        semantic: f32,
        lexical: f32,
        status: SectionStatus,
    ) -> SectionScore {
        SectionScore {
            semantic,
            lexical,
            weight: self.sections.get(kind),
            combined: self.blend.combined(semantic, lexical),
            status,
        }
    }

    /// `100 * Σ weight[k] * combined[k]` over the closed section kind set,
    /// clamped to [0,100]. Kinds absent from the map contribute nothing.
    pub fn aggregate(&self, sections: &BTreeMap<SectionKind, SectionScore>) -> f32 {
        let total: f32 = sections.values().map(|s| s.weight * s.combined).sum();
        (100.0 * total).clamp(0.0, 100.0)
    }
}
