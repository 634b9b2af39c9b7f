//! Cross-cutting, shared constants.
//!
//! Every threshold the verifier applies is named here and surfaced through
//! [`VerifierConfig`](crate::verification::VerifierConfig) so it can be recalibrated
//! per model without touching the algorithm.
//!
//! # Calibration
//!
//! The similarity thresholds assume a cosine-similarity capability (1.0 = identical
//! meaning, 0.0 = unrelated). The support-confidence band assumes softmax
//! probabilities from the entailment classifier. Swapping either model generally
//! means re-deriving these values against a labelled sample.

use std::time::Duration;

/// Lowest "supports" probability accepted from the entailment classifier.
pub const DEFAULT_SUPPORT_CONFIDENCE_MIN: f32 = 0.50;

/// Highest "supports" probability accepted from the entailment classifier.
pub const DEFAULT_SUPPORT_CONFIDENCE_MAX: f32 = 1.00;

/// Similarity a supporting sentence must reach before it earns any vote.
pub const DEFAULT_BASE_SIMILARITY: f32 = 0.50;

/// Similarity above which a supporting sentence earns the high-confidence bonus.
pub const DEFAULT_HIGH_SIMILARITY: f32 = 0.80;

/// Vote tally at or above which an answer is considered supported.
pub const DEFAULT_VOTE_THRESHOLD: u32 = 2;

/// Number of units the ranker keeps while scanning a document.
pub const DEFAULT_TOP_K: usize = 3;

/// Paragraphs scanned per unit of `sentence_bound`.
pub const SCAN_LIMIT_MULTIPLIER: usize = 15;

/// Default timeout for fetching a source document.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(3);

/// Default timeout for a single capability call (classifier, similarity, NER).
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(10);

/// Max tokens fed to local BERT-family models.
pub const DEFAULT_MAX_SEQ_LEN: usize = 512;

/// Host fragments refused by the source policy.
pub const DEFAULT_BLOCKED_DOMAINS: &[&str] = &["reddit"];

/// Path segment marking community-content pages (`/r/<community>/...`).
pub const COMMUNITY_PATH_SEGMENT: &str = "r";

/// Browser-like User-Agent sent when fetching source documents.
pub const FETCH_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/58.0.3029.110 Safari/537.3";

/// Redirect hops followed when fetching a source document.
pub const MAX_FETCH_REDIRECTS: usize = 10;

/// Header carrying a short machine-readable outcome on every gateway response.
pub const STATUS_HEADER: &str = "X-Groundtruth-Status";
