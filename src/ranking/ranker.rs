use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::capability::{CapabilityError, CapabilityResult, SimilarityScorer};

use super::topk::TopK;
use super::types::{RankOptions, ScoredUnit, TextUnit};

/// Selects the units most relevant to a query with a bounded top-K scan.
///
/// Every unit gets exactly one similarity call. Units whose call fails, times out
/// or yields a non-finite score are skipped.
#[derive(Clone)]
pub struct RelevanceRanker {
    scorer: Arc<dyn SimilarityScorer>,
    call_timeout: Option<Duration>,
}

impl std::fmt::Debug for RelevanceRanker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelevanceRanker")
            .field("backend", &self.scorer.backend())
            .field("call_timeout", &self.call_timeout)
            .finish()
    }
}

impl RelevanceRanker {
    pub fn new(scorer: Arc<dyn SimilarityScorer>) -> Self {
        Self {
            scorer,
            call_timeout: None,
        }
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = Some(timeout);
        self
    }

    /// Top `k` units by similarity to `query`, scanning all of `units`.
    pub async fn rank<I>(&self, query: &str, units: I, k: usize) -> Vec<ScoredUnit>
    where
        I: IntoIterator<Item = TextUnit> + Send,
        I::IntoIter: Send,
    {
        self.rank_with(query, units, &RankOptions::top(k)).await
    }

    /// Ranks with explicit options (exclusion of the best unit, scan limit).
    pub async fn rank_with<I>(
        &self,
        query: &str,
        units: I,
        options: &RankOptions,
    ) -> Vec<ScoredUnit>
    where
        I: IntoIterator<Item = TextUnit> + Send,
        I::IntoIter: Send,
    {
        let mut top = TopK::new(options.k);
        let mut consumed = 0usize;
        let mut skipped = 0usize;

        for unit in units {
            if let Some(limit) = options.scan_limit
                && consumed >= limit.max_units()
            {
                debug!(limit = limit.max_units(), "Scan limit reached");
                break;
            }
            consumed += 1;

            let score = match self.score(query, &unit.text).await {
                Ok(score) if score.is_finite() => score,
                Ok(score) => {
                    warn!(
                        position = unit.position,
                        score,
                        "Skipping unit with non-finite score"
                    );
                    skipped += 1;
                    continue;
                }
                Err(e) => {
                    warn!(
                        position = unit.position,
                        error = %e,
                        "Skipping unit after similarity failure"
                    );
                    skipped += 1;
                    continue;
                }
            };

            top.offer(ScoredUnit::new(unit, score));
        }

        let mut ranked = top.into_ranked();
        if options.exclude_top && !ranked.is_empty() {
            ranked.remove(0);
        }

        debug!(
            consumed,
            skipped,
            returned = ranked.len(),
            top_score = ranked.first().map(|u| u.score),
            "Ranking complete"
        );

        ranked
    }

    async fn score(&self, query: &str, text: &str) -> CapabilityResult<f32> {
        match self.call_timeout {
            Some(timeout) => {
                tokio::time::timeout(timeout, self.scorer.similarity(query, text))
                    .await
                    .map_err(|_| CapabilityError::Timeout {
                        capability: "similarity",
                        timeout,
                    })?
            }
            None => self.scorer.similarity(query, text).await,
        }
    }
}
