use std::sync::Arc;

use crate::capability::Capabilities;
use crate::ranking::RelevanceRanker;
use crate::source::{DocumentFetcher, SourceExcerpter, SourcePolicy};
use crate::verification::{EvidenceAggregator, VerificationError, VerifierConfig};

/// Shared handler state. Everything inside is immutable and request-independent.
#[derive(Clone, Debug)]
pub struct AppState {
    pub capabilities: Capabilities,

    pub aggregator: Arc<EvidenceAggregator>,

    pub excerpter: Arc<SourceExcerpter>,
}

impl AppState {
    pub fn new(
        capabilities: Capabilities,
        verifier: VerifierConfig,
        policy: SourcePolicy,
        fetcher: Arc<dyn DocumentFetcher>,
    ) -> Result<Self, VerificationError> {
        let aggregator = EvidenceAggregator::new(&capabilities, verifier)?;
        let ranker = RelevanceRanker::new(capabilities.similarity.clone())
            .with_call_timeout(aggregator.config().call_timeout);
        let excerpter = SourceExcerpter::new(policy, fetcher, ranker);

        Ok(Self {
            capabilities,
            aggregator: Arc::new(aggregator),
            excerpter: Arc::new(excerpter),
        })
    }
}
