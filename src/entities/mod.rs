//! Named-entity overlap between a claim and an evidence sentence.
//!
//! [`EntityOverlapScorer`] is the bonus signal the aggregator awards on top of the
//! similarity baseline. It never gates acceptance on its own.

pub mod heuristic;


pub use heuristic::HeuristicEntityExtractor;

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use crate::capability::{CapabilityResult, EntityExtractor};

/// Counts entities shared between two texts via an injected NER capability.
#[derive(Clone)]
pub struct EntityOverlapScorer {
    extractor: Arc<dyn EntityExtractor>,
}

impl std::fmt::Debug for EntityOverlapScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityOverlapScorer")
            .field("backend", &self.extractor.backend())
            .finish()
    }
}

impl EntityOverlapScorer {
    pub fn new(extractor: Arc<dyn EntityExtractor>) -> Self {
        Self { extractor }
    }

    /// Number of distinct entities of `text_b` that also occur in `text_a`'s entity set.
    ///
    /// Matching is exact on the trimmed surface string. Returns `0` when either
    /// text yields no entities; `text_b` is not extracted at all if `text_a` has none.
    pub async fn overlap(&self, text_a: &str, text_b: &str) -> CapabilityResult<usize> {
        let entities_a = self.entity_set(text_a).await?;
        if entities_a.is_empty() {
            return Ok(0);
        }

        let entities_b = self.entity_set(text_b).await?;
        let shared = entities_b
            .iter()
            .filter(|entity| entities_a.contains(*entity))
            .count();

        debug!(
            entities_a = entities_a.len(),
            entities_b = entities_b.len(),
            shared,
            "Computed entity overlap"
        );

        Ok(shared)
    }

    async fn entity_set(&self, text: &str) -> CapabilityResult<HashSet<String>> {
        Ok(self
            .extractor
            .extract(text)
            .await?
            .into_iter()
            .map(|entity| entity.trim().to_string())
            .filter(|entity| !entity.is_empty())
            .collect())
    }
}
