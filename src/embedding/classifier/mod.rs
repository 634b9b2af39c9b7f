//! Local entailment classifier.
//!
//! Loads a BERT-family sequence-pair classifier (FEVER or NLI fine-tune) and maps its
//! output classes onto [`EntailmentLabel`]s. Without a model path it runs a lexical
//! stub so the service stays usable in development.

pub mod config;


pub use config::ClassifierConfig;

use std::sync::Arc;

use async_trait::async_trait;
use candle_core::{D, Device, Tensor};
use tokenizers::Tokenizer;
use tracing::{debug, info};

use crate::capability::{
    BackendKind, CapabilityError, CapabilityResult, Entailment, EntailmentClassifier,
    EntailmentLabel, LabelScores,
};
use crate::embedding::bert::BertSequenceClassifier;
use crate::embedding::device::select_device;
use crate::embedding::error::EmbeddingError;
use crate::embedding::lexical;
use crate::embedding::utils::{load_tokenizer, missing_model_file};

const CAPABILITY: &str = "classifier";

/// Content-word recall a stub verdict needs before it leaves "neutral".
const STUB_RECALL_THRESHOLD: f32 = 0.5;

enum ClassifierBackend {
    Model {
        device: Device,
        model: BertSequenceClassifier,
        tokenizer: Tokenizer,
        labels: Vec<EntailmentLabel>,
    },
    Stub,
}

/// Entailment classifier backed by local weights or a lexical stub.
#[derive(Clone)]
pub struct NliClassifier {
    backend: Arc<ClassifierBackend>,
    config: ClassifierConfig,
}

impl std::fmt::Debug for NliClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NliClassifier")
            .field("config", &self.config)
            .field("model_loaded", &self.is_model_loaded())
            .finish()
    }
}

impl NliClassifier {
    pub fn load(config: ClassifierConfig) -> Result<Self, EmbeddingError> {
        config.validate()?;

        let Some(model_path) = config.model_path.clone() else {
            info!("No classifier model path configured, operating in stub mode");
            return Ok(Self::stub_with(config));
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
        debug!(?device, "Selected compute device for classifier");
        info!(model_path = %model_path.display(), "Loading entailment classifier");

        let model = BertSequenceClassifier::load(&model_path, &device).map_err(|e| {
            EmbeddingError::ModelLoadFailed {
                reason: format!("Failed to load classifier: {}", e),
            }
        })?;
        let labels = resolve_labels(model.id2label())?;
        let tokenizer = load_tokenizer(&model_path, config.max_seq_len)?;

        info!(
            labels = ?labels,
            "Entailment classifier loaded successfully"
        );

        Ok(Self {
            backend: Arc::new(ClassifierBackend::Model {
                device,
                model,
                tokenizer,
                labels,
            }),
            config,
        })
    }

    pub fn stub() -> Self {
        Self::stub_with(ClassifierConfig::stub())
    }

    fn stub_with(config: ClassifierConfig) -> Self {
        Self {
            backend: Arc::new(ClassifierBackend::Stub),
            config,
        }
    }

    pub fn is_model_loaded(&self) -> bool {
        matches!(*self.backend, ClassifierBackend::Model { .. })
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Synchronous classification; callers on the async path go through
    /// [`EntailmentClassifier::classify`], which moves this onto the blocking pool.
    pub fn classify_blocking(
        &self,
        claim: &str,
        evidence: &str,
    ) -> Result<Entailment, EmbeddingError> {
        let scores = match &*self.backend {
            ClassifierBackend::Model {
                device,
                model,
                tokenizer,
                labels,
            } => score_with_model(device, model, tokenizer, labels, claim, evidence)?,
            ClassifierBackend::Stub => stub_scores(claim, evidence),
        };

        let verdict = Entailment::from_scores(scores);
        debug!(
            label = %verdict.label,
            supports = verdict.confidence.supports,
            "Classified claim/evidence pair"
        );
        Ok(verdict)
    }
}

#[async_trait]
impl EntailmentClassifier for NliClassifier {
    async fn classify(&self, claim: &str, evidence: &str) -> CapabilityResult<Entailment> {
        let this = self.clone();
        let claim = claim.to_string();
        let evidence = evidence.to_string();

        tokio::task::spawn_blocking(move || this.classify_blocking(&claim, &evidence))
            .await
            .map_err(|e| CapabilityError::Inference {
                capability: CAPABILITY,
                reason: format!("classifier task failed: {}", e),
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

fn score_with_model(
    device: &Device,
    model: &BertSequenceClassifier,
    tokenizer: &Tokenizer,
    labels: &[EntailmentLabel],
    claim: &str,
    evidence: &str,
) -> Result<LabelScores, EmbeddingError> {
    // Evidence is the premise, the claim the hypothesis.
    let tokens = tokenizer.encode((evidence, claim), true).map_err(|e| {
        EmbeddingError::TokenizationFailed {
            reason: e.to_string(),
        }
    })?;

    let input_ids = Tensor::new(tokens.get_ids(), device)?.unsqueeze(0)?;
    let type_ids = Tensor::new(tokens.get_type_ids(), device)?.unsqueeze(0)?;
    let attention_mask = Tensor::new(tokens.get_attention_mask(), device)?.unsqueeze(0)?;

    let logits = model.forward(&input_ids, &type_ids, Some(&attention_mask))?;
    let probs = candle_nn::ops::softmax(&logits, D::Minus1)?
        .flatten_all()?
        .to_vec1::<f32>()?;

    if probs.len() != labels.len() {
        return Err(EmbeddingError::InferenceFailed {
            reason: format!(
                "classifier produced {} classes, expected {}",
                probs.len(),
                labels.len()
            ),
        });
    }

    let mut scores = LabelScores::default();
    for (label, prob) in labels.iter().zip(probs) {
        scores.add(*label, prob);
    }
    Ok(scores)
}

/// Maps the model's class names onto verdicts.
///
/// Recognised names (FEVER or NLI) are used as declared. Opaque names such as
/// `LABEL_0` fall back to the positional FEVER order: supports, refutes and, for a
/// three-way head, not-enough-info.
pub fn resolve_labels(id2label: &[String]) -> Result<Vec<EntailmentLabel>, EmbeddingError> {
    let parsed: Option<Vec<EntailmentLabel>> =
        id2label.iter().map(|l| EntailmentLabel::parse(l)).collect();
    if let Some(labels) = parsed
        && !labels.is_empty()
    {
        return Ok(labels);
    }

    match id2label.len() {
        2 => Ok(vec![EntailmentLabel::Supports, EntailmentLabel::Refutes]),
        3 => Ok(vec![
            EntailmentLabel::Supports,
            EntailmentLabel::Refutes,
            EntailmentLabel::Neutral,
        ]),
        n => Err(EmbeddingError::InvalidConfig {
            reason: format!("cannot map {} unnamed classifier labels onto verdicts", n),
        }),
    }
}

/// Lexical stand-in: content-word recall decides relevance, a negation mismatch
/// between claim and evidence flips "supports" to "refutes".
fn stub_scores(claim: &str, evidence: &str) -> LabelScores {
    let recall = lexical::content_recall(claim, evidence);
    if recall < STUB_RECALL_THRESHOLD {
        return LabelScores::new(recall / 2.0, 0.0, 1.0 - recall / 2.0);
    }

    let confidence = 0.5 + recall / 2.0;
    let rest = 1.0 - confidence;
    if lexical::has_negation(claim) != lexical::has_negation(evidence) {
        LabelScores::new(rest / 2.0, confidence, rest / 2.0)
    } else {
        LabelScores::new(confidence, rest / 2.0, rest / 2.0)
    }
}
