use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::constants::DEFAULT_TOP_K;
use crate::ranking::{RankOptions, RelevanceRanker, ScanLimit, ScoredUnit, TextUnit};

use super::error::SourceError;
use super::fetcher::DocumentFetcher;
use super::policy::SourcePolicy;

#[derive(Debug, Clone)]
/// Input of [`SourceExcerpter::excerpt`].
pub struct ExcerptRequest {
    pub url: String,
    /// Expected excerpt length; scanning stops after `sentence_bound × 15` paragraphs.
    pub sentence_bound: usize,
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
/// Paragraphs of a source document most relevant to a question/answer pair.
pub struct SourceExcerpt {
    /// Best paragraphs for the question, minus the single best (usually a paraphrase
    /// of the question itself).
    pub top_question_paragraphs: Vec<ScoredUnit>,
    /// Paragraph most similar to the answer, if any scored above zero.
    pub most_correlated_answer_paragraph: Option<ScoredUnit>,
    /// Paragraphs the document had.
    pub paragraphs_found: usize,
}

/// Fetches a source document and picks the paragraphs worth showing next to an answer.
#[derive(Clone)]
pub struct SourceExcerpter {
    policy: SourcePolicy,
    fetcher: Arc<dyn DocumentFetcher>,
    ranker: RelevanceRanker,
}

impl std::fmt::Debug for SourceExcerpter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceExcerpter")
            .field("policy", &self.policy)
            .field("ranker", &self.ranker)
            .finish()
    }
}

impl SourceExcerpter {
    pub fn new(
        policy: SourcePolicy,
        fetcher: Arc<dyn DocumentFetcher>,
        ranker: RelevanceRanker,
    ) -> Self {
        Self {
            policy,
            fetcher,
            ranker,
        }
    }

    pub fn policy(&self) -> &SourcePolicy {
        &self.policy
    }

    pub async fn excerpt(&self, request: &ExcerptRequest) -> Result<SourceExcerpt, SourceError> {
        let url = self.policy.check(&request.url)?;
        let paragraphs = self.fetcher.fetch_paragraphs(&url).await?;
        let paragraphs_found = paragraphs.len();
        let units = TextUnit::sequence(paragraphs);
        let limit = ScanLimit::from_sentence_bound(request.sentence_bound);

        let question_options = RankOptions::top(DEFAULT_TOP_K)
            .excluding_top()
            .with_scan_limit(limit);
        let top_question_paragraphs = self
            .ranker
            .rank_with(&request.question, units.clone(), &question_options)
            .await;

        let answer_options = RankOptions::top(1).with_scan_limit(limit);
        let most_correlated_answer_paragraph = self
            .ranker
            .rank_with(&request.answer, units, &answer_options)
            .await
            .into_iter()
            .next()
            .filter(|best| best.score > 0.0);

        info!(
            url = %url,
            paragraphs = paragraphs_found,
            scan_limit = limit.max_units(),
            question_matches = top_question_paragraphs.len(),
            answer_match = most_correlated_answer_paragraph.is_some(),
            "Excerpted source document"
        );

        Ok(SourceExcerpt {
            top_question_paragraphs,
            most_correlated_answer_paragraph,
            paragraphs_found,
        })
    }
}
