//! Model capabilities consumed by the verifier.
//!
//! The entailment classifier, the similarity function and the entity tagger are
//! opaque to the ranking and voting logic. Components receive them as trait objects
//! at construction, so the same aggregator runs against local models
//! ([`crate::embedding`]), a remote model service ([`remote`]) or scripted fakes
//! (`mock`, behind `cfg(any(test, feature = "mock"))`).

pub mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod remote;
pub mod types;

#[cfg(test)]
mod tests;

pub use error::{CapabilityError, CapabilityResult};
#[cfg(any(test, feature = "mock"))]
pub use mock::{MockEntailmentClassifier, MockEntityExtractor, MockSimilarityScorer};
pub use remote::{RemoteModelService, RemoteServiceConfig};
pub use types::{BackendKind, Entailment, EntailmentLabel, LabelScores};

use std::sync::Arc;

use async_trait::async_trait;

#[async_trait]
/// Classifies whether `evidence` supports, refutes or is neutral toward `claim`.
pub trait EntailmentClassifier: Send + Sync {
    /// Returns the predicted label plus a confidence per label.
    async fn classify(&self, claim: &str, evidence: &str) -> CapabilityResult<Entailment>;

    /// Which kind of backend answers the calls.
    fn backend(&self) -> BackendKind;
}

#[async_trait]
/// Semantic similarity between two texts (cosine convention: 1.0 = same meaning).
pub trait SimilarityScorer: Send + Sync {
    /// Scores `text_a` against `text_b`.
    async fn similarity(&self, text_a: &str, text_b: &str) -> CapabilityResult<f32>;

    /// Which kind of backend answers the calls.
    fn backend(&self) -> BackendKind;
}

#[async_trait]
/// Named-entity tagger returning entity surface strings in document order.
pub trait EntityExtractor: Send + Sync {
    /// Extracts entity surface strings from `text`.
    async fn extract(&self, text: &str) -> CapabilityResult<Vec<String>>;

    /// Which kind of backend answers the calls.
    fn backend(&self) -> BackendKind;
}

/// The three model capabilities, instantiated once and shared by handle.
#[derive(Clone)]
pub struct Capabilities {
    pub classifier: Arc<dyn EntailmentClassifier>,
    pub similarity: Arc<dyn SimilarityScorer>,
    pub entities: Arc<dyn EntityExtractor>,
}

impl Capabilities {
    pub fn new(
        classifier: Arc<dyn EntailmentClassifier>,
        similarity: Arc<dyn SimilarityScorer>,
        entities: Arc<dyn EntityExtractor>,
    ) -> Self {
        Self {
            classifier,
            similarity,
            entities,
        }
    }

    /// Routes all three capabilities through a single remote model service.
    pub fn remote(service: Arc<RemoteModelService>) -> Self {
        Self {
            classifier: service.clone(),
            similarity: service.clone(),
            entities: service,
        }
    }
}

impl std::fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Capabilities")
            .field("classifier", &self.classifier.backend())
            .field("similarity", &self.similarity.backend())
            .field("entities", &self.entities.backend())
            .finish()
    }
}
