use std::collections::HashSet;

use serde::Serialize;

use crate::capability::EntailmentLabel;

use super::sentences::normalize_whitespace;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// A sentence accepted into the supporting set.
pub struct Evidence {
    /// Whitespace-normalised sentence text.
    pub text: String,
    /// Index of the sentence among all candidate sentences of the request.
    pub position: usize,
}

/// Insertion-ordered evidence with no two entries sharing normalised text.
#[derive(Debug, Clone, Default)]
pub struct EvidenceSet {
    entries: Vec<Evidence>,
    seen: HashSet<String>,
}

impl EvidenceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `text` unless an entry with the same normalised text exists.
    /// Returns `false` for duplicates.
    pub fn insert(&mut self, text: &str, position: usize) -> bool {
        let normalized = normalize_whitespace(text);
        if !self.seen.insert(normalized.clone()) {
            return false;
        }
        self.entries.push(Evidence {
            text: normalized,
            position,
        });
        true
    }

    pub fn contains(&self, text: &str) -> bool {
        self.seen.contains(&normalize_whitespace(text))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_vec(self) -> Vec<Evidence> {
        self.entries
    }
}

/// Request-scoped vote counter. Only ever increases.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct VoteTally(u32);

impl VoteTally {
    pub fn new() -> Self {
        Self(0)
    }

    pub fn add(&mut self, votes: u32) {
        self.0 = self.0.saturating_add(votes);
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl From<u32> for VoteTally {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
/// Votes one sentence earned after clearing the base similarity gate.
pub struct SentenceVotes {
    /// Entailment plus similarity acceptance.
    pub baseline: bool,
    /// At least one entity shared with the claim.
    pub entity_bonus: bool,
    /// Similarity above the high threshold.
    pub high_similarity_bonus: bool,
}

impl SentenceVotes {
    pub fn total(&self) -> u32 {
        [self.baseline, self.entity_bonus, self.high_similarity_bonus]
            .into_iter()
            .filter(|v| *v)
            .count() as u32
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
/// What happened to one candidate sentence.
pub enum SentenceOutcome {
    /// Classifier label was not "supports".
    NotSupporting { label: EntailmentLabel },
    /// Label was "supports" but its confidence fell outside the band.
    OutsideConfidenceBand { confidence: f32 },
    /// Same normalised text was already accepted.
    Duplicate,
    /// Classifier call failed or timed out.
    ClassifierFailed { error: String },
    /// Accepted as evidence; similarity call failed or timed out.
    SimilarityFailed { error: String },
    /// Accepted as evidence; similarity below the base threshold.
    BelowSimilarity { similarity: f32 },
    /// Accepted and voted.
    Voted {
        similarity: f32,
        /// `None` when entity extraction failed.
        entity_overlap: Option<usize>,
        votes: SentenceVotes,
    },
}

impl SentenceOutcome {
    pub fn votes(&self) -> u32 {
        match self {
            SentenceOutcome::Voted { votes, .. } => votes.total(),
            _ => 0,
        }
    }

    /// Whether the sentence entered the evidence set.
    pub fn is_evidence(&self) -> bool {
        matches!(
            self,
            SentenceOutcome::SimilarityFailed { .. }
                | SentenceOutcome::BelowSimilarity { .. }
                | SentenceOutcome::Voted { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
/// Per-sentence audit trail entry.
pub struct SentenceAudit {
    pub sentence: String,
    pub position: usize,
    #[serde(flatten)]
    pub outcome: SentenceOutcome,
}

impl SentenceAudit {
    pub fn votes(&self) -> u32 {
        self.outcome.votes()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
/// Final verdict with its supporting evidence. Immutable once built.
pub struct VerificationResult {
    supported: bool,
    vote_tally: u32,
    evidence: Vec<Evidence>,
    audit: Vec<SentenceAudit>,
}

impl VerificationResult {
    pub(crate) fn new(
        supported: bool,
        tally: VoteTally,
        evidence: Vec<Evidence>,
        audit: Vec<SentenceAudit>,
    ) -> Self {
        Self {
            supported,
            vote_tally: tally.value(),
            evidence,
            audit,
        }
    }

    pub fn supported(&self) -> bool {
        self.supported
    }

    pub fn vote_tally(&self) -> u32 {
        self.vote_tally
    }

    pub fn evidence(&self) -> &[Evidence] {
        &self.evidence
    }

    /// Evidence texts in first-accepted order.
    pub fn evidence_texts(&self) -> Vec<String> {
        self.evidence.iter().map(|e| e.text.clone()).collect()
    }

    pub fn audit(&self) -> &[SentenceAudit] {
        &self.audit
    }
}
