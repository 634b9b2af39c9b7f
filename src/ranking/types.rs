use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_TOP_K, SCAN_LIMIT_MULTIPLIER};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// A candidate sentence or paragraph from a source document.
pub struct TextUnit {
    pub text: String,
    /// Position in the source document; breaks ties between equal scores.
    pub position: usize,
}

impl TextUnit {
    pub fn new(text: impl Into<String>, position: usize) -> Self {
        Self {
            text: text.into(),
            position,
        }
    }

    /// Numbers `texts` by their order in the document.
    pub fn sequence<I, S>(texts: I) -> Vec<TextUnit>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        texts
            .into_iter()
            .enumerate()
            .map(|(position, text)| TextUnit::new(text, position))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
/// A unit with the relevance score from a single similarity call.
pub struct ScoredUnit {
    #[serde(flatten)]
    pub unit: TextUnit,
    pub score: f32,
}

impl ScoredUnit {
    pub fn new(unit: TextUnit, score: f32) -> Self {
        Self { unit, score }
    }

    pub fn text(&self) -> &str {
        &self.unit.text
    }

    pub fn position(&self) -> usize {
        self.unit.position
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Maximum number of units consumed from the input, scored or not.
pub struct ScanLimit(usize);

impl ScanLimit {
    pub fn new(max_units: usize) -> Self {
        Self(max_units)
    }

    /// `sentence_bound × 15` units.
    pub fn from_sentence_bound(sentence_bound: usize) -> Self {
        Self(sentence_bound.saturating_mul(SCAN_LIMIT_MULTIPLIER))
    }

    pub fn max_units(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Options for [`RelevanceRanker::rank_with`](super::RelevanceRanker::rank_with).
pub struct RankOptions {
    /// Units held while scanning.
    pub k: usize,
    /// Drop the single best unit from the output.
    pub exclude_top: bool,
    /// Stop consuming input after this many units. `None` scans everything.
    pub scan_limit: Option<ScanLimit>,
}

impl Default for RankOptions {
    fn default() -> Self {
        Self {
            k: DEFAULT_TOP_K,
            exclude_top: false,
            scan_limit: None,
        }
    }
}

impl RankOptions {
    pub fn top(k: usize) -> Self {
        Self {
            k,
            ..Default::default()
        }
    }

    pub fn excluding_top(mut self) -> Self {
        self.exclude_top = true;
        self
    }

    pub fn with_scan_limit(mut self, limit: ScanLimit) -> Self {
        self.scan_limit = Some(limit);
        self
    }

    /// Upper bound on the number of returned units.
    pub fn max_results(&self) -> usize {
        if self.exclude_top {
            self.k.saturating_sub(1)
        } else {
            self.k
        }
    }
}
