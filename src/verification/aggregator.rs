use std::future::Future;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::capability::{
    Capabilities, CapabilityError, CapabilityResult, EntailmentClassifier, EntailmentLabel,
    SimilarityScorer,
};
use crate::entities::EntityOverlapScorer;

use super::config::VerifierConfig;
use super::decision::VerificationDecision;
use super::error::VerificationError;
use super::sentences::{flatten_blocks, normalize_whitespace};
use super::types::{
    EvidenceSet, SentenceAudit, SentenceOutcome, SentenceVotes, VerificationResult, VoteTally,
};

/// Majority-vote engine over a claim and its candidate evidence sentences.
///
/// Per sentence: the classifier must say "supports" with a confidence inside the
/// configured band; the sentence then joins the evidence set (once per normalised
/// text) and is scored for similarity against the claim. At or above the base
/// threshold it earns one vote, plus one for a shared entity and one for similarity
/// above the high threshold. Capability failures cost the sentence its votes and
/// never abort the run.
#[derive(Clone)]
pub struct EvidenceAggregator {
    classifier: Arc<dyn EntailmentClassifier>,
    similarity: Arc<dyn SimilarityScorer>,
    entities: EntityOverlapScorer,
    config: VerifierConfig,
    decision: VerificationDecision,
}

impl std::fmt::Debug for EvidenceAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvidenceAggregator")
            .field("classifier", &self.classifier.backend())
            .field("similarity", &self.similarity.backend())
            .field("entities", &self.entities)
            .field("config", &self.config)
            .finish()
    }
}

impl EvidenceAggregator {
    pub fn new(
        capabilities: &Capabilities,
        config: VerifierConfig,
    ) -> Result<Self, VerificationError> {
        config.validate()?;

        Ok(Self {
            classifier: capabilities.classifier.clone(),
            similarity: capabilities.similarity.clone(),
            entities: EntityOverlapScorer::new(capabilities.entities.clone()),
            decision: VerificationDecision::new(config.vote_threshold),
            config,
        })
    }

    pub fn config(&self) -> &VerifierConfig {
        &self.config
    }

    /// Splits each evidence block into sentences, then aggregates.
    pub async fn verify<S: AsRef<str>>(
        &self,
        claim: &str,
        evidence_blocks: &[S],
    ) -> VerificationResult {
        let sentences = flatten_blocks(evidence_blocks);
        self.aggregate(claim, &sentences).await
    }

    /// Votes over already-split candidate sentences, in order.
    ///
    /// A blank claim has nothing to support: it is unsupported with no evidence,
    /// and no capability is called.
    pub async fn aggregate(&self, claim: &str, sentences: &[String]) -> VerificationResult {
        let mut tally = VoteTally::new();
        let mut evidence = EvidenceSet::new();

        let claim = normalize_whitespace(claim);
        if claim.is_empty() {
            debug!(sentences = sentences.len(), "Blank claim; skipping evaluation");
            return self.decision.decide_audited(tally, evidence, Vec::new());
        }

        let mut audit = Vec::with_capacity(sentences.len());

        for (position, raw) in sentences.iter().enumerate() {
            let sentence = normalize_whitespace(raw);
            if sentence.is_empty() {
                continue;
            }

            let outcome = self
                .evaluate(&claim, &sentence, position, &mut evidence)
                .await;
            tally.add(outcome.votes());

            debug!(
                position,
                votes = outcome.votes(),
                tally = tally.value(),
                "Evaluated evidence sentence"
            );

            audit.push(SentenceAudit {
                sentence,
                position,
                outcome,
            });
        }

        let result = self.decision.decide_audited(tally, evidence, audit);
        info!(
            sentences = sentences.len(),
            evidence = result.evidence().len(),
            tally = result.vote_tally(),
            supported = result.supported(),
            "Aggregated evidence"
        );

        result
    }

    async fn evaluate(
        &self,
        claim: &str,
        sentence: &str,
        position: usize,
        evidence: &mut EvidenceSet,
    ) -> SentenceOutcome {
        let verdict = match self
            .bounded("classifier", self.classifier.classify(claim, sentence))
            .await
        {
            Ok(verdict) => verdict,
            Err(e) => {
                warn!(position, error = %e, "Classifier failed; sentence earns no votes");
                return SentenceOutcome::ClassifierFailed {
                    error: e.to_string(),
                };
            }
        };

        if verdict.label != EntailmentLabel::Supports {
            return SentenceOutcome::NotSupporting {
                label: verdict.label,
            };
        }

        let confidence = verdict.supports_confidence();
        if !self.config.accepts_confidence(confidence) {
            return SentenceOutcome::OutsideConfidenceBand { confidence };
        }

        if !evidence.insert(sentence, position) {
            return SentenceOutcome::Duplicate;
        }

        let similarity = match self
            .bounded("similarity", self.similarity.similarity(claim, sentence))
            .await
        {
            Ok(score) if score.is_finite() => score,
            Ok(score) => {
                warn!(position, score, "Similarity is not finite; sentence earns no votes");
                return SentenceOutcome::SimilarityFailed {
                    error: format!("non-finite similarity {score}"),
                };
            }
            Err(e) => {
                warn!(position, error = %e, "Similarity failed; sentence earns no votes");
                return SentenceOutcome::SimilarityFailed {
                    error: e.to_string(),
                };
            }
        };

        if similarity < self.config.base_similarity {
            return SentenceOutcome::BelowSimilarity { similarity };
        }

        let entity_overlap = match self
            .bounded("entities", self.entities.overlap(claim, sentence))
            .await
        {
            Ok(shared) => Some(shared),
            Err(e) => {
                warn!(position, error = %e, "Entity extraction failed; no entity bonus");
                None
            }
        };

        let votes = SentenceVotes {
            baseline: true,
            entity_bonus: entity_overlap.is_some_and(|shared| shared >= 1),
            high_similarity_bonus: similarity > self.config.high_similarity,
        };

        SentenceOutcome::Voted {
            similarity,
            entity_overlap,
            votes,
        }
    }

    async fn bounded<T, F>(&self, capability: &'static str, call: F) -> CapabilityResult<T>
    where
        F: Future<Output = CapabilityResult<T>>,
    {
        let timeout = self.config.call_timeout;
        tokio::time::timeout(timeout, call)
            .await
            .map_err(|_| CapabilityError::Timeout {
                capability,
                timeout,
            })?
    }
}
