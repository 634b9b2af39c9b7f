//! Multi-signal verification of a claim against source sentences.
//!
//! [`EvidenceAggregator`] turns per-sentence classifier, similarity and entity
//! signals into a [`VoteTally`] and a deduplicated [`EvidenceSet`];
//! [`VerificationDecision`] applies the final threshold. All state is request-scoped.

mod aggregator;
mod config;
mod decision;
mod error;
pub mod sentences;
mod types;

#[cfg(test)]
mod tests;

pub use aggregator::EvidenceAggregator;
pub use config::VerifierConfig;
pub use decision::VerificationDecision;
pub use error::VerificationError;
pub use sentences::{normalize_whitespace, split_sentences};
pub use types::{
    Evidence, EvidenceSet, SentenceAudit, SentenceOutcome, SentenceVotes, VerificationResult,
    VoteTally,
};
