//! Local sentence encoder for semantic similarity.
//!
//! Use [`SentenceEncoder::stub`] for tests without model files; the stub scores
//! pairs by term-frequency cosine.

pub mod config;


pub use config::EncoderConfig;

use std::sync::Arc;

use async_trait::async_trait;
use candle_core::{Device, Tensor};
use tokenizers::Tokenizer;
use tracing::{debug, info};

use crate::capability::{BackendKind, CapabilityError, CapabilityResult, SimilarityScorer};
use crate::embedding::bert::BertEncoder;
use crate::embedding::device::select_device;
use crate::embedding::error::EmbeddingError;
use crate::embedding::lexical;
use crate::embedding::utils::{cosine_similarity, load_tokenizer, missing_model_file};

const CAPABILITY: &str = "similarity";

enum EncoderBackend {
    Model {
        device: Device,
        model: BertEncoder,
        tokenizer: Tokenizer,
    },
    Stub,
}

/// Similarity scorer: cosine of mean-pooled sentence embeddings.
#[derive(Clone)]
pub struct SentenceEncoder {
    backend: Arc<EncoderBackend>,
    config: EncoderConfig,
}

impl std::fmt::Debug for SentenceEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SentenceEncoder")
            .field("config", &self.config)
            .field("model_loaded", &self.is_model_loaded())
            .finish()
    }
}

impl SentenceEncoder {
    pub fn load(config: EncoderConfig) -> Result<Self, EmbeddingError> {
        config.validate()?;

        let Some(model_path) = config.model_path.clone() else {
            info!("No encoder model path configured, operating in stub mode");
            return Ok(Self {
                backend: Arc::new(EncoderBackend::Stub),
                config,
            });
        };

        if !model_path.exists() {
            return Err(EmbeddingError::ModelNotFound { path: model_path });
        }
        if let Some(file) = missing_model_file(&model_path) {
            return Err(EmbeddingError::ModelLoadFailed {
                reason: format!("Missing {} in {}", file, model_path.display()),
            });
        }

        let device = select_device()?;
        info!(model_path = %model_path.display(), "Loading sentence encoder");

        let model =
            BertEncoder::load(&model_path, &device).map_err(|e| EmbeddingError::ModelLoadFailed {
                reason: format!("Failed to load encoder: {}", e),
            })?;
        let tokenizer = load_tokenizer(&model_path, config.max_seq_len)?;

        info!("Sentence encoder loaded successfully");

        Ok(Self {
            backend: Arc::new(EncoderBackend::Model {
                device,
                model,
                tokenizer,
            }),
            config,
        })
    }

    pub fn stub() -> Self {
        Self {
            backend: Arc::new(EncoderBackend::Stub),
            config: EncoderConfig::stub(),
        }
    }

    pub fn is_model_loaded(&self) -> bool {
        matches!(*self.backend, EncoderBackend::Model { .. })
    }

    /// Mean-pooled embedding of `text`. Only available with a loaded model.
    pub fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        match &*self.backend {
            EncoderBackend::Model {
                device,
                model,
                tokenizer,
            } => {
                let tokens =
                    tokenizer
                        .encode(text, true)
                        .map_err(|e| EmbeddingError::TokenizationFailed {
                            reason: e.to_string(),
                        })?;

                let input_ids = Tensor::new(tokens.get_ids(), device)?.unsqueeze(0)?;
                let type_ids = Tensor::new(tokens.get_type_ids(), device)?.unsqueeze(0)?;
                let attention_mask =
                    Tensor::new(tokens.get_attention_mask(), device)?.unsqueeze(0)?;

                let pooled = model.forward(&input_ids, &type_ids, &attention_mask)?;
                Ok(pooled.flatten_all()?.to_vec1::<f32>()?)
            }
            EncoderBackend::Stub => Err(EmbeddingError::InvalidConfig {
                reason: "stub encoder does not produce embeddings".to_string(),
            }),
        }
    }

    /// Synchronous similarity score in `[-1, 1]` (stub: `[0, 1]`).
    pub fn similarity_blocking(&self, text_a: &str, text_b: &str) -> Result<f32, EmbeddingError> {
        let score = match &*self.backend {
            EncoderBackend::Model { .. } => {
                let a = self.embed(text_a)?;
                let b = self.embed(text_b)?;
                cosine_similarity(&a, &b)
            }
            EncoderBackend::Stub => lexical::term_frequency_cosine(text_a, text_b),
        };

        debug!(score, "Computed similarity");
        Ok(score)
    }
}

#[async_trait]
impl SimilarityScorer for SentenceEncoder {
    async fn similarity(&self, text_a: &str, text_b: &str) -> CapabilityResult<f32> {
        let this = self.clone();
        let text_a = text_a.to_string();
        let text_b = text_b.to_string();

        tokio::task::spawn_blocking(move || this.similarity_blocking(&text_a, &text_b))
            .await
            .map_err(|e| CapabilityError::Inference {
                capability: CAPABILITY,
                reason: format!("encoder task failed: {}", e),
            })?
            .map_err(|e| CapabilityError::inference(CAPABILITY, e))
    }

    fn backend(&self) -> BackendKind {
        if self.is_model_loaded() {
            BackendKind::Model
        } else {
            BackendKind::Stub
        }
    }
}
