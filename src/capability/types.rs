use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Entailment classifier verdict.
pub enum EntailmentLabel {
    /// Evidence supports the claim.
    Supports,
    /// Evidence contradicts the claim.
    Refutes,
    /// Evidence neither supports nor contradicts the claim.
    Neutral,
}

impl EntailmentLabel {
    /// Maps common NLI / fact-verification label names onto a verdict.
    ///
    /// Accepts FEVER-style (`SUPPORTS`, `REFUTES`, `NOT ENOUGH INFO`) and
    /// MNLI-style (`entailment`, `contradiction`, `neutral`) names, case-insensitively.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_lowercase().replace(['_', '-'], " ");
        match normalized.as_str() {
            "supports" | "support" | "supported" | "entailment" | "entails" => {
                Some(Self::Supports)
            }
            "refutes" | "refute" | "refuted" | "contradiction" | "contradicts" => {
                Some(Self::Refutes)
            }
            "neutral" | "not enough info" | "nei" | "not enough information" => {
                Some(Self::Neutral)
            }
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntailmentLabel::Supports => "supports",
            EntailmentLabel::Refutes => "refutes",
            EntailmentLabel::Neutral => "neutral",
        }
    }
}

impl std::fmt::Display for EntailmentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
/// Confidence assigned to each label.
pub struct LabelScores {
    #[serde(default)]
    pub supports: f32,
    #[serde(default)]
    pub refutes: f32,
    #[serde(default)]
    pub neutral: f32,
}

impl LabelScores {
    pub fn new(supports: f32, refutes: f32, neutral: f32) -> Self {
        Self {
            supports,
            refutes,
            neutral,
        }
    }

    pub fn get(&self, label: EntailmentLabel) -> f32 {
        match label {
            EntailmentLabel::Supports => self.supports,
            EntailmentLabel::Refutes => self.refutes,
            EntailmentLabel::Neutral => self.neutral,
        }
    }

    pub(crate) fn add(&mut self, label: EntailmentLabel, value: f32) {
        match label {
            EntailmentLabel::Supports => self.supports += value,
            EntailmentLabel::Refutes => self.refutes += value,
            EntailmentLabel::Neutral => self.neutral += value,
        }
    }

    /// Highest-scoring label. Ties resolve toward neutral, then refutes.
    pub fn argmax(&self) -> EntailmentLabel {
        let mut best = EntailmentLabel::Neutral;
        for label in [EntailmentLabel::Refutes, EntailmentLabel::Supports] {
            if self.get(label) > self.get(best) {
                best = label;
            }
        }
        best
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
/// Output of [`EntailmentClassifier::classify`](super::EntailmentClassifier::classify).
pub struct Entailment {
    pub label: EntailmentLabel,
    pub confidence: LabelScores,
}

impl Entailment {
    pub fn new(label: EntailmentLabel, confidence: LabelScores) -> Self {
        Self { label, confidence }
    }

    /// Builds a verdict whose label is the highest-scoring class.
    pub fn from_scores(confidence: LabelScores) -> Self {
        Self {
            label: confidence.argmax(),
            confidence,
        }
    }

    pub fn supports_confidence(&self) -> f32 {
        self.confidence.supports
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
/// What answers a capability's calls (reported by `/ready`).
pub enum BackendKind {
    /// Local model weights.
    Model,
    /// Deterministic lexical fallback (no model files).
    Stub,
    /// Remote model service over HTTP.
    Remote,
    /// Rule-based implementation.
    Heuristic,
    /// Scripted fake.
    Mock,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Model => "model",
            BackendKind::Stub => "stub",
            BackendKind::Remote => "remote",
            BackendKind::Heuristic => "heuristic",
            BackendKind::Mock => "mock",
        }
    }
}
