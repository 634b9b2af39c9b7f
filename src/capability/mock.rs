//! Scripted capability fakes for deterministic, network-free tests.
//!
//! Each fake is keyed by the candidate text (the second argument of a pair call, or
//! the single argument of [`EntityExtractor::extract`]). Unknown inputs fall back to a
//! configurable default.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::error::{CapabilityError, CapabilityResult};
use super::types::{BackendKind, Entailment, EntailmentLabel, LabelScores};
use super::{EntailmentClassifier, EntityExtractor, SimilarityScorer};

/// Entailment classifier returning pre-registered verdicts per evidence sentence.
pub struct MockEntailmentClassifier {
    verdicts: HashMap<String, Entailment>,
    default: Entailment,
    failing: HashSet<String>,
    calls: Mutex<Vec<(String, String)>>,
}

impl Default for MockEntailmentClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl MockEntailmentClassifier {
    /// Every unknown sentence is classified neutral with full confidence.
    pub fn new() -> Self {
        Self {
            verdicts: HashMap::new(),
            default: Entailment::new(EntailmentLabel::Neutral, LabelScores::new(0.0, 0.0, 1.0)),
            failing: HashSet::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_verdict(mut self, evidence: &str, verdict: Entailment) -> Self {
        self.verdicts.insert(evidence.to_string(), verdict);
        self
    }

    /// Registers a "supports" verdict with the given supports-confidence.
    pub fn supporting(self, evidence: &str, confidence: f32) -> Self {
        let rest = (1.0 - confidence).max(0.0);
        self.with_verdict(
            evidence,
            Entailment::new(
                EntailmentLabel::Supports,
                LabelScores::new(confidence, rest / 2.0, rest / 2.0),
            ),
        )
    }

    pub fn refuting(self, evidence: &str, confidence: f32) -> Self {
        let rest = (1.0 - confidence).max(0.0);
        self.with_verdict(
            evidence,
            Entailment::new(
                EntailmentLabel::Refutes,
                LabelScores::new(rest / 2.0, confidence, rest / 2.0),
            ),
        )
    }

    pub fn with_default(mut self, verdict: Entailment) -> Self {
        self.default = verdict;
        self
    }

    pub fn failing_on(mut self, evidence: &str) -> Self {
        self.failing.insert(evidence.to_string());
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl EntailmentClassifier for MockEntailmentClassifier {
    async fn classify(&self, claim: &str, evidence: &str) -> CapabilityResult<Entailment> {
        self.calls
            .lock()
            .push((claim.to_string(), evidence.to_string()));

        if self.failing.contains(evidence) {
            return Err(CapabilityError::Request {
                capability: "classifier",
                reason: "scripted failure".to_string(),
            });
        }

        Ok(self.verdicts.get(evidence).copied().unwrap_or(self.default))
    }

    fn backend(&self) -> BackendKind {
        BackendKind::Mock
    }
}

/// Similarity scorer returning pre-registered scores per candidate text.
pub struct MockSimilarityScorer {
    scores: HashMap<String, f32>,
    default: f32,
    failing: HashSet<String>,
    delays: HashMap<String, Duration>,
    calls: Mutex<Vec<(String, String)>>,
}

impl Default for MockSimilarityScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSimilarityScorer {
    /// Unknown candidates score `0.0`.
    pub fn new() -> Self {
        Self {
            scores: HashMap::new(),
            default: 0.0,
            failing: HashSet::new(),
            delays: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_score(mut self, candidate: &str, score: f32) -> Self {
        self.scores.insert(candidate.to_string(), score);
        self
    }

    pub fn with_default(mut self, score: f32) -> Self {
        self.default = score;
        self
    }

    pub fn failing_on(mut self, candidate: &str) -> Self {
        self.failing.insert(candidate.to_string());
        self
    }

    /// Sleeps before answering for `candidate` (exercises call timeouts).
    pub fn delayed(mut self, candidate: &str, delay: Duration) -> Self {
        self.delays.insert(candidate.to_string(), delay);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl SimilarityScorer for MockSimilarityScorer {
    async fn similarity(&self, text_a: &str, text_b: &str) -> CapabilityResult<f32> {
        self.calls
            .lock()
            .push((text_a.to_string(), text_b.to_string()));

        if let Some(delay) = self.delays.get(text_b) {
            tokio::time::sleep(*delay).await;
        }

        if self.failing.contains(text_b) {
            return Err(CapabilityError::Request {
                capability: "similarity",
                reason: "scripted failure".to_string(),
            });
        }

        Ok(self.scores.get(text_b).copied().unwrap_or(self.default))
    }

    fn backend(&self) -> BackendKind {
        BackendKind::Mock
    }
}

/// Entity extractor returning pre-registered entity lists per text.
#[derive(Default)]
pub struct MockEntityExtractor {
    entities: HashMap<String, Vec<String>>,
    failing: HashSet<String>,
    calls: Mutex<Vec<String>>,
}

impl MockEntityExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entities(mut self, text: &str, entities: &[&str]) -> Self {
        self.entities.insert(
            text.to_string(),
            entities.iter().map(|e| e.to_string()).collect(),
        );
        self
    }

    pub fn failing_on(mut self, text: &str) -> Self {
        self.failing.insert(text.to_string());
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl EntityExtractor for MockEntityExtractor {
    async fn extract(&self, text: &str) -> CapabilityResult<Vec<String>> {
        self.calls.lock().push(text.to_string());

        if self.failing.contains(text) {
            return Err(CapabilityError::Request {
                capability: "entities",
                reason: "scripted failure".to_string(),
            });
        }

        Ok(self.entities.get(text).cloned().unwrap_or_default())
    }

    fn backend(&self) -> BackendKind {
        BackendKind::Mock
    }
}
