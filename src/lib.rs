//! Groundtruth library crate (used by the server and integration tests).
//!
//! # Public API Surface
//!
//! ## Core Types
//! - [`Config`], [`ConfigError`] - Server configuration
//! - [`Capabilities`] - Injected entailment, similarity and entity capabilities
//! - [`EvidenceAggregator`], [`VerifierConfig`], [`VerificationResult`] - Multi-signal voting
//!
//! ## Ranking & Sources
//! - [`RelevanceRanker`], [`TopK`], [`RankOptions`] - Bounded top-K relevance ranking
//! - [`SourceExcerpter`], [`SourcePolicy`] - Fetch, filter and excerpt source documents
//!
//! ## Local Models
//! - [`NliClassifier`], [`SentenceEncoder`] - Candle-backed capabilities with stub fallbacks
//! - [`HeuristicEntityExtractor`] - Model-free entity tagging
//!
//! ## Test/Mock Support
//! Mock implementations are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod capability;
pub mod config;
pub mod constants;
pub mod embedding;
pub mod entities;
pub mod gateway;
pub mod ranking;
pub mod source;
pub mod verification;

pub use capability::{
    BackendKind, Capabilities, CapabilityError, CapabilityResult, Entailment, EntailmentClassifier,
    EntailmentLabel, EntityExtractor, LabelScores, RemoteModelService, RemoteServiceConfig,
    SimilarityScorer,
};
#[cfg(any(test, feature = "mock"))]
pub use capability::{MockEntailmentClassifier, MockEntityExtractor, MockSimilarityScorer};

pub use config::{Config, ConfigError};
pub use embedding::{
    ClassifierConfig, EmbeddingError, EncoderConfig, NliClassifier, SentenceEncoder,
};
pub use entities::{EntityOverlapScorer, HeuristicEntityExtractor};
pub use ranking::{
    RankOptions, RelevanceRanker, ScanLimit, ScoredUnit, SimilarityRating, TextUnit, TopK,
};
#[cfg(any(test, feature = "mock"))]
pub use source::MockDocumentFetcher;
pub use source::{
    DocumentFetcher, ExcerptRequest, HttpDocumentFetcher, SourceError, SourceExcerpt,
    SourceExcerpter, SourcePolicy,
};
pub use verification::{
    Evidence, EvidenceAggregator, EvidenceSet, SentenceAudit, SentenceOutcome, VerificationDecision,
    VerificationError, VerificationResult, VerifierConfig, VoteTally,
};
