//! Integration tests for the matching engine
//!
//! These drive the public API end-to-end through a deterministic stub
//! embedding backend, so no model files are needed.

use profile_matcher::config::Config;
use profile_matcher::engine::aggregate::{SectionStatus, SectionWeights};
use profile_matcher::engine::attribution::Sign;
use profile_matcher::engine::embedder::{mean_pool, Embedder, EmbeddingVector};
use profile_matcher::engine::matcher::{MatchEngine, MatchRequest};
use profile_matcher::engine::similarity::similarity;
use profile_matcher::error::{MatcherError, Result};
use profile_matcher::profile::loader;
use profile_matcher::profile::model::{
    DegreeLevel, SectionContent, SectionKind, StructuredProfile,
};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Deterministic text-to-vector stub: counts bytes into fixed slots.
/// Identical text always embeds identically, shared tokens raise cosine.
struct StubEmbedder;

impl Embedder for StubEmbedder {
    fn embed(&self, text: &str) -> Result<EmbeddingVector> {
        let mut vector = vec![0.0; self.dimension()];
        for byte in text.to_lowercase().bytes() {
            vector[(byte as usize) % 16] += 1.0;
        }
        Ok(vector)
    }

    fn dimension(&self) -> usize {
        16
    }
}

/// Stub whose every call fails, standing in for a broken model backend.
struct FailingEmbedder;

impl Embedder for FailingEmbedder {
    fn embed(&self, _text: &str) -> Result<EmbeddingVector> {
        Err(MatcherError::ModelUnavailable("backend down".to_string()))
    }

    fn dimension(&self) -> usize {
        16
    }
}

fn engine() -> MatchEngine {
    MatchEngine::new(&Config::default(), Arc::new(StubEmbedder), "stub".to_string()).unwrap()
}

fn keyword_set(keywords: &[&str]) -> BTreeSet<String> {
    keywords.iter().map(|k| k.to_string()).collect()
}

fn profile_with_skills(spans: &[&str], keywords: &[&str]) -> StructuredProfile {
    let mut profile = StructuredProfile::default();
    profile.sections.insert(
        SectionKind::Skills,
        SectionContent::new(spans.iter().map(|s| s.to_string()).collect()),
    );
    profile
        .raw_keywords
        .insert(SectionKind::Skills, keyword_set(keywords));
    profile
}

#[test]
fn end_to_end_scenario_matches_the_scoring_formula() {
    let candidate = profile_with_skills(&["python", "sql"], &["python", "sql"]);
    let requirement = profile_with_skills(&["python", "sql", "aws"], &["python", "sql", "aws"]);

    let request = MatchRequest {
        candidate,
        requirement,
        weights: None,
    };
    let result = engine().match_profiles(&request).unwrap();

    let skills = &result.sections[&SectionKind::Skills];
    assert_eq!(skills.status, SectionStatus::Scored);
    assert!((skills.lexical - 2.0 / 3.0).abs() < 1e-6);
    assert!(skills.semantic >= 0.0 && skills.semantic <= 1.0);

    // Recompute the expected semantic term through the same stub backend
    let stub = StubEmbedder;
    let candidate_vectors = vec![
        stub.embed("python").unwrap(),
        stub.embed("sql").unwrap(),
    ];
    let requirement_vectors = vec![
        stub.embed("python").unwrap(),
        stub.embed("sql").unwrap(),
        stub.embed("aws").unwrap(),
    ];
    let expected_semantic = similarity(
        &mean_pool(&requirement_vectors, 16),
        &mean_pool(&candidate_vectors, 16),
    )
    .unwrap();
    assert!((skills.semantic - expected_semantic).abs() < 1e-6);

    // Empty sections on both sides: semantic 0 via the sentinel, lexical 1.0
    // via the empty-requirement rule
    for kind in [SectionKind::Experience, SectionKind::Education, SectionKind::Other] {
        let score = &result.sections[&kind];
        assert_eq!(score.semantic, 0.0);
        assert_eq!(score.lexical, 1.0);
        assert!((score.combined - 0.4).abs() < 1e-6);
        assert_eq!(score.status, SectionStatus::MissingContent);
    }

    let expected_overall = 100.0
        * (0.40 * (0.6 * expected_semantic + 0.4 * (2.0 / 3.0))
            + 0.30 * 0.4
            + 0.15 * 0.4
            + 0.15 * 0.4);
    let overall = result.overall.unwrap();
    assert!((overall - expected_overall).abs() < 1e-3);

    // The one unmet requirement keyword shows up as the only gap
    assert_eq!(result.gaps.len(), 1);
    assert_eq!(result.gaps[0].keyword, "aws");
    assert!(result.gaps[0].importance > 0.0);

    assert!(!result.is_degraded());
    assert_eq!(result.model.as_deref(), Some("stub"));
}

#[test]
fn degraded_input_scenario_scores_on_the_lexical_term_alone() {
    // Requirement Skills section exists but has no usable spans
    let candidate = profile_with_skills(&["python"], &["python"]);
    let mut requirement = StructuredProfile::default();
    requirement
        .sections
        .insert(SectionKind::Skills, SectionContent::new(vec![String::new()]));

    let request = MatchRequest {
        candidate,
        requirement,
        weights: None,
    };
    let result = engine().match_profiles(&request).unwrap();

    let skills = &result.sections[&SectionKind::Skills];
    // Zero-vector sentinel: no semantic signal, never NaN
    assert_eq!(skills.semantic, 0.0);
    // No requirement keywords listed: nothing required, nothing missing
    assert_eq!(skills.lexical, 1.0);
    assert!((skills.combined - 0.4).abs() < 1e-6);
    assert_eq!(skills.status, SectionStatus::MissingContent);

    // Defined numeric result, not a failure
    assert!(result.overall.is_some());
    assert!(result.gaps.is_empty());
}

#[test]
fn missing_model_degrades_the_response_instead_of_failing() {
    let config = Config::default();
    let engine = MatchEngine::without_model(&config, "model files not found".to_string()).unwrap();

    let candidate = profile_with_skills(&["python"], &["python"]);
    let requirement = profile_with_skills(&["python", "aws"], &["python", "aws"]);

    let request = MatchRequest {
        candidate,
        requirement,
        weights: None,
    };
    let result = engine.match_profiles(&request).unwrap();

    assert!(result.overall.is_none());
    assert!(result.is_degraded());
    assert!(result
        .degraded
        .iter()
        .any(|reason| reason.starts_with("model_unavailable:")));

    for score in result.sections.values() {
        assert_eq!(score.status, SectionStatus::Unavailable);
        assert_eq!(score.semantic, 0.0);
    }

    // Lexical analysis needs no embeddings and still runs
    let skills = &result.sections[&SectionKind::Skills];
    assert_eq!(skills.lexical, 0.5);
    assert_eq!(result.gaps.len(), 1);
    assert_eq!(result.gaps[0].keyword, "aws");
    assert!(result.attributions.is_empty());
}

#[test]
fn embedding_failure_mid_request_degrades_the_response() {
    let engine = MatchEngine::new(
        &Config::default(),
        Arc::new(FailingEmbedder),
        "broken".to_string(),
    )
    .unwrap();

    let request = MatchRequest {
        candidate: profile_with_skills(&["python"], &["python"]),
        requirement: profile_with_skills(&["python"], &["python"]),
        weights: None,
    };

    // The request still succeeds; the failure is flagged, never hidden
    let result = engine.match_profiles(&request).unwrap();
    assert!(result.overall.is_none());
    assert!(result
        .degraded
        .iter()
        .any(|reason| reason.contains("backend down")));
    for score in result.sections.values() {
        assert_eq!(score.status, SectionStatus::Unavailable);
    }
}

#[test]
fn invalid_weight_override_fails_fast_before_scoring() {
    let request = MatchRequest {
        candidate: profile_with_skills(&["python"], &["python"]),
        requirement: profile_with_skills(&["python"], &["python"]),
        weights: Some(SectionWeights {
            skills: 0.9,
            experience: 0.9,
            education: 0.0,
            other: 0.0,
        }),
    };

    let err = engine().match_profiles(&request).unwrap_err();
    assert!(matches!(err, MatcherError::Configuration(_)));
}

#[test]
fn weight_override_changes_the_aggregate() {
    let candidate = profile_with_skills(&["python"], &["python"]);
    let requirement = profile_with_skills(&["python"], &["python", "aws"]);

    let default_request = MatchRequest {
        candidate: candidate.clone(),
        requirement: requirement.clone(),
        weights: None,
    };
    let skill_heavy_request = MatchRequest {
        candidate,
        requirement,
        weights: Some(SectionWeights {
            skills: 0.85,
            experience: 0.05,
            education: 0.05,
            other: 0.05,
        }),
    };

    let engine = engine();
    let default_result = engine.match_profiles(&default_request).unwrap();
    let skill_heavy_result = engine.match_profiles(&skill_heavy_request).unwrap();

    assert_ne!(default_result.overall, skill_heavy_result.overall);
}

#[test]
fn attributions_rank_aligned_phrases_positive() {
    let candidate = profile_with_skills(
        &["python backend services", "competitive knitting"],
        &["python"],
    );
    let requirement = profile_with_skills(&["python backend services"], &["python"]);

    let request = MatchRequest {
        candidate,
        requirement,
        weights: None,
    };
    let result = engine().match_profiles(&request).unwrap();

    assert!(!result.attributions.is_empty());
    assert!(result.attributions.len() <= 10);

    let aligned = result
        .attributions
        .iter()
        .find(|a| a.phrase == "python backend services")
        .unwrap();
    assert_eq!(aligned.sign, Sign::Positive);
    assert_eq!(aligned.section, SectionKind::Skills);

    // Ranked by magnitude
    for pair in result.attributions.windows(2) {
        assert!(pair[0].contribution.abs() >= pair[1].contribution.abs());
    }
}

#[test]
fn match_results_are_reproducible() {
    let request = MatchRequest {
        candidate: profile_with_skills(&["python", "sql", "docker"], &["python", "sql", "docker"]),
        requirement: profile_with_skills(&["python", "kubernetes"], &["python", "kubernetes"]),
        weights: None,
    };

    let engine = engine();
    let first = engine.match_profiles(&request).unwrap();
    let second = engine.match_profiles(&request).unwrap();

    assert_eq!(first.overall, second.overall);
    assert_eq!(first.attributions.len(), second.attributions.len());
    for (a, b) in first.attributions.iter().zip(second.attributions.iter()) {
        assert_eq!(a.phrase, b.phrase);
        assert_eq!(a.contribution, b.contribution);
    }
    assert_eq!(
        first.gaps.iter().map(|g| &g.keyword).collect::<Vec<_>>(),
        second.gaps.iter().map(|g| &g.keyword).collect::<Vec<_>>()
    );
}

#[test]
fn metadata_checks_flow_through_the_match() {
    let mut candidate = profile_with_skills(&["python"], &["python"]);
    candidate.metadata.years_experience = Some(2.0);
    candidate.metadata.degree_level = Some(DegreeLevel::Master);

    let mut requirement = profile_with_skills(&["python"], &["python"]);
    requirement.metadata.years_experience = Some(5.0);
    requirement.metadata.degree_level = Some(DegreeLevel::Bachelor);

    let request = MatchRequest {
        candidate,
        requirement,
        weights: None,
    };
    let result = engine().match_profiles(&request).unwrap();

    assert_eq!(result.checks.len(), 2);
    let years = result
        .checks
        .iter()
        .find(|c| c.name == "years_experience")
        .unwrap();
    assert_eq!(years.satisfied, Some(false));
    let degree = result.checks.iter().find(|c| c.name == "degree_level").unwrap();
    assert_eq!(degree.satisfied, Some(true));
}

#[test]
fn profiles_load_from_disk_and_match() {
    let dir = tempfile::tempdir().unwrap();

    let candidate_path = dir.path().join("candidate.json");
    std::fs::write(
        &candidate_path,
        r#"{
            "sections": {
                "skills": { "spans": ["Python and SQL data pipelines"] },
                "experience": { "spans": ["Four years as a backend engineer"] }
            },
            "metadata": { "years_experience": 4.0 }
        }"#,
    )
    .unwrap();

    let requirement_path = dir.path().join("requirement.json");
    std::fs::write(
        &requirement_path,
        r#"{
            "sections": {
                "skills": { "spans": ["Python, SQL and AWS"] }
            },
            "raw_keywords": {
                "skills": ["python", "sql", "aws"]
            },
            "metadata": { "years_experience": 3.0 }
        }"#,
    )
    .unwrap();

    let candidate = loader::load_profile(&candidate_path).unwrap();
    let requirement = loader::load_profile(&requirement_path).unwrap();

    // Keywords were derived from spans where absent
    assert!(candidate
        .keywords(SectionKind::Skills)
        .unwrap()
        .contains("python"));

    let request = MatchRequest {
        candidate,
        requirement,
        weights: None,
    };
    let result = engine().match_profiles(&request).unwrap();

    assert!(result.overall.is_some());
    assert_eq!(result.gaps.len(), 1);
    assert_eq!(result.gaps[0].keyword, "aws");
    assert_eq!(result.checks[0].satisfied, Some(true));
}

#[test]
fn match_request_round_trips_through_json() {
    let request = MatchRequest {
        candidate: profile_with_skills(&["python"], &["python"]),
        requirement: profile_with_skills(&["python", "aws"], &["python", "aws"]),
        weights: Some(SectionWeights::default()),
    };

    let json = serde_json::to_string(&request).unwrap();
    let parsed: MatchRequest = serde_json::from_str(&json).unwrap();
    let result = engine().match_profiles(&parsed).unwrap();
    assert!(result.overall.is_some());

    // And the response serializes for downstream consumers
    let response_json = serde_json::to_string(&result).unwrap();
    let value: serde_json::Value = serde_json::from_str(&response_json).unwrap();
    assert!(value["sections"]["skills"]["lexical"].is_number());
    assert!(value["gaps"].is_array());
}
