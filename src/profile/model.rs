//! Structured profile types shared by both sides of a match
//!
//! A `StructuredProfile` is the already-parsed representation of a candidate
//! or requirement document, produced by an external extractor. The engine
//! never mutates one; profiles are borrowed for the duration of a single
//! match call.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Closed set of comparable content categories. Embeddings for two sections
/// are only comparable when they share the same kind (and the same model).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Skills,
    Experience,
    Education,
    Other,
}

impl SectionKind {
    pub const ALL: [SectionKind; 4] = [
        SectionKind::Skills,
        SectionKind::Experience,
        SectionKind::Education,
        SectionKind::Other,
    ];
}

impl std::fmt::Display for SectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SectionKind::Skills => write!(f, "Skills"),
            SectionKind::Experience => write!(f, "Experience"),
            SectionKind::Education => write!(f, "Education"),
            SectionKind::Other => write!(f, "Other"),
        }
    }
}

/// Ordered text spans (sentences/phrases) belonging to one section kind.
/// Spans are non-empty by construction; empty input is represented by an
/// empty span list, not by blank spans.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SectionContent {
    pub spans: Vec<String>,
}

impl SectionContent {
    /// Build section content, dropping empty and whitespace-only spans.
    pub fn new(spans: Vec<String>) -> Self {
        let spans = spans
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        Self { spans }
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    pub fn span_count(&self) -> usize {
        self.spans.len()
    }
}

/// Degree levels as an ordinal scale; the derived ordering follows
/// declaration order, so `Bachelor < Master` holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegreeLevel {
    HighSchool,
    Associate,
    Bachelor,
    Master,
    Doctorate,
}

impl std::fmt::Display for DegreeLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DegreeLevel::HighSchool => write!(f, "high school"),
            DegreeLevel::Associate => write!(f, "associate"),
            DegreeLevel::Bachelor => write!(f, "bachelor"),
            DegreeLevel::Master => write!(f, "master"),
            DegreeLevel::Doctorate => write!(f, "doctorate"),
        }
    }
}

/// Optional structured facts used for advisory rule-based checks, never for
/// score mutation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileMetadata {
    pub years_experience: Option<f32>,
    pub degree_level: Option<DegreeLevel>,
}

/// The normalized, already-parsed representation of a candidate or
/// requirement document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuredProfile {
    #[serde(default)]
    pub sections: BTreeMap<SectionKind, SectionContent>,
    /// Per-section normalized keyword sets (lower-cased, deduplicated)
    #[serde(default)]
    pub raw_keywords: BTreeMap<SectionKind, BTreeSet<String>>,
    #[serde(default)]
    pub metadata: ProfileMetadata,
}

impl StructuredProfile {
    pub fn section(&self, kind: SectionKind) -> Option<&SectionContent> {
        self.sections.get(&kind)
    }

    pub fn keywords(&self, kind: SectionKind) -> Option<&BTreeSet<String>> {
        self.raw_keywords.get(&kind)
    }

    /// Union of all per-section keyword sets.
    pub fn keyword_union(&self) -> BTreeSet<String> {
        self.raw_keywords
            .values()
            .flat_map(|set| set.iter().cloned())
            .collect()
    }

    /// All spans across sections, in section order.
    pub fn all_spans(&self) -> Vec<String> {
        self.sections
            .values()
            .flat_map(|content| content.spans.iter().cloned())
            .collect()
    }
}
