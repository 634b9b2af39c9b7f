//! Local model backends.
//!
//! - [`classifier`] implements [`EntailmentClassifier`](crate::capability::EntailmentClassifier).
//! - [`encoder`] implements [`SimilarityScorer`](crate::capability::SimilarityScorer).
//!
//! Both load BERT-family safetensors checkpoints through candle, and fall back to
//! [`lexical`] scoring when no model directory is configured.

/// BERT sequence classifier and mean-pooling encoder.
pub mod bert;
/// Entailment classifier.
pub mod classifier;
/// Device selection (CPU / Metal / CUDA).
pub mod device;
/// Sentence encoder.
pub mod encoder;
mod error;
pub mod lexical;
/// Tokenizer/model loading helpers.
pub mod utils;

pub use classifier::{ClassifierConfig, NliClassifier};
pub use encoder::{EncoderConfig, SentenceEncoder};
pub use error::EmbeddingError;
