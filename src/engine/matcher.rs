//! Match engine orchestration
//!
//! One engine instance serves many independent match requests. The engine is
//! `Send + Sync`: concurrent requests share only the read-only embedding
//! model. Input profiles are borrowed and never mutated; the returned
//! `MatchResult` is owned by the caller and nothing is retained.

use crate::config::Config;
use crate::engine::aggregate::{ScoringPolicy, SectionScore, SectionStatus, SectionWeights};
use crate::engine::attribution::{self, Attribution, SectionSpans};
use crate::engine::embedder::{
    is_zero_vector, mean_pool, Embedder, Model2VecEmbedder, SectionEmbedder,
};
use crate::engine::gaps::{self, Gap};
use crate::engine::overlap;
use crate::engine::similarity;
use crate::error::{MatcherError, Result};
use crate::profile::model::{SectionContent, SectionKind, StructuredProfile};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchRequest {
    pub candidate: StructuredProfile,
    pub requirement: StructuredProfile,
    /// Optional override of the configured section weights; validated
    /// (sum-to-1.0) before any scoring happens.
    #[serde(default)]
    pub weights: Option<SectionWeights>,
}

/// Advisory comparison of structured metadata facts. Never feeds back into
/// the numeric score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataCheck {
    pub name: String,
    /// `None` when the candidate side is unspecified
    pub satisfied: Option<bool>,
    pub detail: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    /// Overall compatibility in [0,100]; `None` when embeddings were
    /// unavailable and the score could not be computed.
    pub overall: Option<f32>,
    /// Machine-readable degradation markers; empty for a complete result.
    pub degraded: Vec<String>,
    pub sections: BTreeMap<SectionKind, SectionScore>,
    /// Advisory explanation of the score. Consumers must not feed these back
    /// into further scoring.
    pub attributions: Vec<Attribution>,
    /// Advisory, like `attributions`. Empty means "no gaps", not "skipped".
    pub gaps: Vec<Gap>,
    pub checks: Vec<MetadataCheck>,
    /// Embedding model that produced the semantic terms, when one was used
    pub model: Option<String>,
    pub processing_time_ms: u64,
}

impl MatchResult {
    pub fn is_degraded(&self) -> bool {
        !self.degraded.is_empty()
    }
}

pub struct MatchEngine {
    embedder: Option<SectionEmbedder>,
    model_name: Option<String>,
    unavailable_reason: Option<String>,
    policy: ScoringPolicy,
    top_k: usize,
}

impl MatchEngine {
    /// Build an engine over an injected embedding backend. Weight policy
    /// violations are fatal here, before any request is processed.
    pub fn new(config: &Config, backend: Arc<dyn Embedder>, model_name: String) -> Result<Self> {
        let policy = ScoringPolicy::new(
            config.scoring.blend,
            config.scoring.section_weights,
        )?;

        Ok(Self {
            embedder: Some(SectionEmbedder::new(backend)),
            model_name: Some(model_name),
            unavailable_reason: None,
            policy,
            top_k: config.scoring.attribution_top_k,
        })
    }

    /// Build an engine whose embedding capability is missing. Every match
    /// produces a degraded response: `overall = None`, sections flagged
    /// unavailable, lexical analysis and gaps still computed.
    pub fn without_model(config: &Config, reason: String) -> Result<Self> {
        let policy = ScoringPolicy::new(
            config.scoring.blend,
            config.scoring.section_weights,
        )?;

        Ok(Self {
            embedder: None,
            model_name: None,
            unavailable_reason: Some(reason),
            policy,
            top_k: config.scoring.attribution_top_k,
        })
    }

    /// Load the shared Model2Vec model (lazily, once per process) and build
    /// the engine. A model that cannot be loaded even after the retry does
    /// not fail construction: the engine degrades per the error policy.
    pub async fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;

        match Model2VecEmbedder::shared(config).await {
            Ok(backend) => {
                let model_name = backend.model_name().to_string();
                Self::new(config, Arc::new(backend), model_name)
            }
            Err(MatcherError::ModelUnavailable(reason)) => {
                warn!("Running without embeddings: {}", reason);
                Self::without_model(config, reason)
            }
            Err(e) => Err(e),
        }
    }

    /// Match one candidate against one requirement. An embedding capability
    /// that fails mid-request does not fail the match: the result degrades
    /// (`overall = None`, sections flagged unavailable) and the reason is
    /// recorded, so callers can distinguish "low match" from "not computed".
    pub fn match_profiles(&self, request: &MatchRequest) -> Result<MatchResult> {
        let started = Instant::now();
        let policy = self.request_policy(request)?;

        let lexical = self.lexical_scores(request);

        let semantic = match &self.embedder {
            Some(embedder) => match self.semantic_scores(embedder, request) {
                Ok(scored) => Ok(scored),
                Err(MatcherError::ModelUnavailable(reason)) => {
                    warn!("Embedding capability failed mid-request: {}", reason);
                    Err(reason)
                }
                Err(e) => return Err(e),
            },
            None => Err(self
                .unavailable_reason
                .clone()
                .unwrap_or_else(|| "embedding model unavailable".to_string())),
        };

        let mut degraded = Vec::new();
        let mut sections = BTreeMap::new();

        let (overall, attributions) = match semantic {
            Ok(scored) => {
                for kind in SectionKind::ALL {
                    let (value, status) = scored.semantic[&kind];
                    sections.insert(kind, policy.score_section(kind, value, lexical[&kind], status));
                }

                let overall = policy.aggregate(&sections);
                let attributions = attribution::attribute(
                    &policy,
                    &sections,
                    &scored.attribution_inputs,
                    scored.dimension,
                    self.top_k,
                )?;
                (Some(overall), attributions)
            }
            Err(reason) => {
                for kind in SectionKind::ALL {
                    sections.insert(
                        kind,
                        policy.score_section(kind, 0.0, lexical[&kind], SectionStatus::Unavailable),
                    );
                }
                degraded.push(format!("model_unavailable:{}", reason));
                (None, Vec::new())
            }
        };

        let gaps = gaps::analyze(
            &request.requirement.keyword_union(),
            &request.candidate.keyword_union(),
            &request.requirement.all_spans(),
            None,
        )?;

        let checks = metadata_checks(&request.candidate, &request.requirement);

        let elapsed = started.elapsed();
        info!(
            "Match completed in {:.2?}: overall {:?}, {} gaps, {} attributions",
            elapsed,
            overall,
            gaps.len(),
            attributions.len()
        );

        Ok(MatchResult {
            overall,
            degraded,
            sections,
            attributions,
            gaps,
            checks,
            model: self.model_name.clone(),
            processing_time_ms: elapsed.as_millis() as u64,
        })
    }

    /// Resolve the policy for one request: a weights override replaces the
    /// configured section weights and is validated before any scoring.
    fn request_policy(&self, request: &MatchRequest) -> Result<ScoringPolicy> {
        match request.weights {
            Some(weights) => ScoringPolicy::new(self.policy.blend, weights),
            None => Ok(self.policy.clone()),
        }
    }

    /// Per-section lexical overlap. Pure set arithmetic; always computable.
    fn lexical_scores(&self, request: &MatchRequest) -> BTreeMap<SectionKind, f32> {
        let empty_keywords = BTreeSet::new();

        SectionKind::ALL
            .iter()
            .map(|&kind| {
                let requirement = request.requirement.keywords(kind).unwrap_or(&empty_keywords);
                let candidate = request.candidate.keywords(kind).unwrap_or(&empty_keywords);
                (kind, overlap::overlap(requirement, candidate))
            })
            .collect()
    }

    /// Per-section semantic similarity plus the span vectors the attribution
    /// pass reuses. The four kinds have no data dependency on each other;
    /// they are scored in one bounded in-memory loop.
    fn semantic_scores(
        &self,
        embedder: &SectionEmbedder,
        request: &MatchRequest,
    ) -> Result<SemanticScores> {
        let empty_content = SectionContent::default();
        let mut semantic = BTreeMap::new();
        let mut attribution_inputs = Vec::new();

        for kind in SectionKind::ALL {
            let requirement_content = request
                .requirement
                .section(kind)
                .unwrap_or(&empty_content);
            let candidate_content = request.candidate.section(kind).unwrap_or(&empty_content);

            let span_vectors = embedder.embed_spans(&candidate_content.spans)?;
            let candidate_vector = mean_pool(&span_vectors, embedder.dimension());
            let requirement_vector = embedder.embed_section(requirement_content)?;

            let value = similarity::similarity(&requirement_vector, &candidate_vector)?;

            let no_content =
                is_zero_vector(&requirement_vector) || is_zero_vector(&candidate_vector);
            let status = if no_content {
                SectionStatus::MissingContent
            } else {
                SectionStatus::Scored
            };

            debug!("{}: semantic {:.3}", kind, value);
            semantic.insert(kind, (value, status));

            if matches!(kind, SectionKind::Skills | SectionKind::Experience) {
                attribution_inputs.push(SectionSpans {
                    kind,
                    spans: candidate_content.spans.clone(),
                    span_vectors,
                    requirement_vector,
                });
            }
        }

        Ok(SemanticScores {
            semantic,
            attribution_inputs,
            dimension: embedder.dimension(),
        })
    }
}

/// Output of the embedding pass: per-kind semantic values with their status,
/// and the cached vectors attribution masks against.
struct SemanticScores {
    semantic: BTreeMap<SectionKind, (f32, SectionStatus)>,
    attribution_inputs: Vec<SectionSpans>,
    dimension: usize,
}

fn metadata_checks(
    candidate: &StructuredProfile,
    requirement: &StructuredProfile,
) -> Vec<MetadataCheck> {
    let mut checks = Vec::new();

    if let Some(required) = requirement.metadata.years_experience {
        let (satisfied, detail) = match candidate.metadata.years_experience {
            Some(actual) => (
                Some(actual >= required),
                format!(
                    "requires {:.1} years of experience, candidate has {:.1}",
                    required, actual
                ),
            ),
            None => (
                None,
                format!(
                    "requires {:.1} years of experience, candidate unspecified",
                    required
                ),
            ),
        };
        checks.push(MetadataCheck {
            name: "years_experience".to_string(),
            satisfied,
            detail,
        });
    }

    if let Some(required) = requirement.metadata.degree_level {
        let (satisfied, detail) = match candidate.metadata.degree_level {
            Some(actual) => (
                Some(actual >= required),
                format!("requires {} degree, candidate holds {}", required, actual),
            ),
            None => (
                None,
                format!("requires {} degree, candidate unspecified", required),
            ),
        };
        checks.push(MetadataCheck {
            name: "degree_level".to_string(),
            satisfied,
            detail,
        });
    }

    checks
}
