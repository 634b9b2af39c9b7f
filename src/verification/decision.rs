use tracing::debug;

use crate::constants::DEFAULT_VOTE_THRESHOLD;

use super::types::{EvidenceSet, SentenceAudit, VerificationResult, VoteTally};

/// Applies the accept/reject threshold to a finished tally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerificationDecision {
    vote_threshold: u32,
}

impl Default for VerificationDecision {
    fn default() -> Self {
        Self::new(DEFAULT_VOTE_THRESHOLD)
    }
}

impl VerificationDecision {
    pub fn new(vote_threshold: u32) -> Self {
        Self { vote_threshold }
    }

    pub fn vote_threshold(&self) -> u32 {
        self.vote_threshold
    }

    pub fn is_supported(&self, tally: VoteTally) -> bool {
        tally.value() >= self.vote_threshold
    }

    /// `supported = tally >= vote_threshold`; evidence keeps insertion order.
    pub fn decide(&self, tally: VoteTally, evidence: EvidenceSet) -> VerificationResult {
        self.decide_audited(tally, evidence, Vec::new())
    }

    pub fn decide_audited(
        &self,
        tally: VoteTally,
        evidence: EvidenceSet,
        audit: Vec<SentenceAudit>,
    ) -> VerificationResult {
        let supported = self.is_supported(tally);
        debug!(
            tally = tally.value(),
            threshold = self.vote_threshold,
            evidence = evidence.len(),
            supported,
            "Verification decided"
        );
        VerificationResult::new(supported, tally, evidence.into_vec(), audit)
    }
}
