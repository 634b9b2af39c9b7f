//! Bounded top-K relevance ranking of document units.
//!
//! [`RelevanceRanker`] scores each [`TextUnit`] once against a query and keeps the
//! `k` best in a min-heap, so memory stays `O(k)` whatever the document length.
//! Results are ordered by score descending with source position breaking ties.

mod ranker;
mod rating;
mod topk;
mod types;


pub use ranker::RelevanceRanker;
pub use rating::SimilarityRating;
pub use topk::TopK;
pub use types::{RankOptions, ScanLimit, ScoredUnit, TextUnit};
