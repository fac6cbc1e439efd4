//! Section embedding over a shared Model2Vec capability
//!
//! The embedding step is a function-shaped capability: anything that maps
//! text to a fixed-dimension vector. Swapping model versions is a
//! configuration change, never a new type. The concrete backend is a
//! Model2Vec static model loaded lazily once per process; the loaded model
//! is immutable and `encode_single` is a read-only lookup, so concurrent
//! match requests share it without further synchronization.

use crate::config::Config;
use crate::error::{MatcherError, Result};
use crate::profile::model::SectionContent;
use log::{info, warn};
use model2vec_rs::model::StaticModel;
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

/// Fixed-dimension embedding of one section. The all-zeros vector is the
/// "no content" sentinel; downstream similarity treats it as zero signal.
pub type EmbeddingVector = Vec<f32>;

pub fn zero_vector(dimension: usize) -> EmbeddingVector {
    vec![0.0; dimension]
}

pub fn is_zero_vector(vector: &[f32]) -> bool {
    vector.iter().all(|v| *v == 0.0)
}

/// Text-to-vector capability. Implementations must be deterministic: the
/// same text against the same model version yields identical output.
pub trait Embedder: Send + Sync {
    fn embed(&self, text: &str) -> Result<EmbeddingVector>;
    fn dimension(&self) -> usize;
}

static SHARED_MODEL: OnceLock<Arc<StaticModel>> = OnceLock::new();

/// Model2Vec backend over the process-wide shared model instance.
pub struct Model2VecEmbedder {
    model: Arc<StaticModel>,
    dimension: usize,
    model_name: String,
}

impl Model2VecEmbedder {
    /// Get the shared model, loading it on first use. A failed load is
    /// retried once after the configured backoff; a second failure surfaces
    /// as `ModelUnavailable` so the caller can degrade instead of hanging.
    pub async fn shared(config: &Config) -> Result<Self> {
        let model = match SHARED_MODEL.get() {
            Some(model) => model.clone(),
            None => {
                let loaded = match Self::load(config) {
                    Ok(model) => model,
                    Err(first) => {
                        let backoff = Duration::from_millis(config.model.load_retry_backoff_ms);
                        warn!(
                            "Embedding model load failed ({}), retrying in {:?}",
                            first, backoff
                        );
                        tokio::time::sleep(backoff).await;
                        Self::load(config).map_err(|second| {
                            MatcherError::ModelUnavailable(format!(
                                "{} (after retry; first attempt: {})",
                                second, first
                            ))
                        })?
                    }
                };
                // A lost init race just discards the duplicate model
                SHARED_MODEL.get_or_init(|| Arc::new(loaded)).clone()
            }
        };

        let dimension = model.encode_single("dimension probe").len();
        Ok(Self {
            model,
            dimension,
            model_name: config.model.embedding_model.clone(),
        })
    }

    fn load(config: &Config) -> anyhow::Result<StaticModel> {
        let reference = config.model_reference();
        let started = Instant::now();
        info!("Loading embedding model from {}", reference.display());
        let model = StaticModel::from_pretrained(&reference, None, None, None)?;
        info!("Embedding model loaded in {:.2?}", started.elapsed());
        Ok(model)
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }
}

impl Embedder for Model2VecEmbedder {
    fn embed(&self, text: &str) -> Result<EmbeddingVector> {
        Ok(self.model.encode_single(text))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Embeds section content as the mean of its span embeddings. Pooling at the
/// span level is what lets attribution mask individual phrases later without
/// re-encoding anything.
pub struct SectionEmbedder {
    backend: Arc<dyn Embedder>,
}

impl SectionEmbedder {
    pub fn new(backend: Arc<dyn Embedder>) -> Self {
        Self { backend }
    }

    pub fn dimension(&self) -> usize {
        self.backend.dimension()
    }

    pub fn embed_spans(&self, spans: &[String]) -> Result<Vec<EmbeddingVector>> {
        spans.iter().map(|span| self.backend.embed(span)).collect()
    }

    /// Embed a whole section. An empty section yields the zero sentinel
    /// rather than an error.
    pub fn embed_section(&self, content: &SectionContent) -> Result<EmbeddingVector> {
        let vectors = self.embed_spans(&content.spans)?;
        Ok(mean_pool(&vectors, self.dimension()))
    }
}

/// Arithmetic mean of the given vectors; the zero sentinel when none.
pub fn mean_pool(vectors: &[EmbeddingVector], dimension: usize) -> EmbeddingVector {
    if vectors.is_empty() {
        return zero_vector(dimension);
    }

    let mut pooled = zero_vector(dimension);
    for vector in vectors {
        for (slot, value) in pooled.iter_mut().zip(vector.iter()) {
            *slot += value;
        }
    }
    let count = vectors.len() as f32;
    for slot in pooled.iter_mut() {
        *slot /= count;
    }
    pooled
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic stand-in for the model: maps each character to a fixed
    /// slot so identical text always embeds identically.
    struct CharFreqEmbedder;

    impl Embedder for CharFreqEmbedder {
        fn embed(&self, text: &str) -> Result<EmbeddingVector> {
            let mut vector = zero_vector(self.dimension());
            for byte in text.bytes() {
                vector[(byte as usize) % 8] += 1.0;
            }
            Ok(vector)
        }

        fn dimension(&self) -> usize {
            8
        }
    }

    fn embedder() -> SectionEmbedder {
        SectionEmbedder::new(Arc::new(CharFreqEmbedder))
    }

    #[test]
    fn empty_section_embeds_to_zero_sentinel() {
        let vector = embedder().embed_section(&SectionContent::default()).unwrap();
        assert!(is_zero_vector(&vector));
        assert_eq!(vector.len(), 8);
    }

    #[test]
    fn embedding_is_idempotent() {
        let content = SectionContent::new(vec!["python and sql".to_string()]);
        let first = embedder().embed_section(&content).unwrap();
        let second = embedder().embed_section(&content).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn section_embedding_is_mean_of_span_embeddings() {
        let embedder = embedder();
        let spans = vec!["ab".to_string(), "cd".to_string()];
        let span_vectors = embedder.embed_spans(&spans).unwrap();
        let section = embedder
            .embed_section(&SectionContent::new(spans))
            .unwrap();

        let expected = mean_pool(&span_vectors, 8);
        assert_eq!(section, expected);
    }

    #[test]
    fn mean_pool_of_nothing_is_zero() {
        assert!(is_zero_vector(&mean_pool(&[], 4)));
    }

    #[test]
    fn mean_pool_averages_components() {
        let pooled = mean_pool(&[vec![1.0, 0.0], vec![0.0, 1.0]], 2);
        assert_eq!(pooled, vec![0.5, 0.5]);
    }
}
