//! Lexical scoring used when no model weights are configured.
//!
//! These functions back the stub modes of [`NliClassifier`](super::NliClassifier) and
//! [`SentenceEncoder`](super::SentenceEncoder). They are deterministic and cheap, and
//! are good enough for development and tests, not for production verdicts.

use std::collections::{HashMap, HashSet};

const STOP_WORDS: &[&str] = &[
    "a", "an", "the", "is", "are", "was", "were", "be", "been", "being", "have", "has", "had",
    "do", "does", "did", "will", "would", "could", "should", "may", "might", "must", "shall",
    "can", "to", "of", "in", "for", "on", "with", "at", "by", "from", "as", "into", "through",
    "during", "before", "after", "above", "below", "between", "under", "again", "then", "once",
    "here", "there", "when", "where", "why", "how", "all", "each", "few", "more", "most",
    "other", "some", "such", "only", "own", "same", "so", "than", "too", "very", "just", "and",
    "but", "if", "or", "because", "until", "while", "what", "which", "who", "whom", "this",
    "that", "these", "those", "am", "it", "its",
];

const NEGATIONS: &[&str] = &[
    "not", "no", "never", "none", "nor", "neither", "nobody", "nothing", "cannot", "isn't",
    "wasn't", "aren't", "weren't", "doesn't", "didn't", "don't", "won't", "hasn't", "haven't",
];

/// Whether `word` (lowercase) is a function word.
pub fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.contains(&word)
}

/// Lowercased word tokens, split on anything that is not alphanumeric or `'`.
pub fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .map(|w| w.trim_matches('\'').to_lowercase())
        .filter(|w| !w.is_empty())
}

/// Distinct lowercased words of `text` with stop words removed.
pub fn content_words(text: &str) -> HashSet<String> {
    words(text)
        .filter(|w| !is_stop_word(w) && !NEGATIONS.contains(&w.as_str()))
        .collect()
}

/// Cosine similarity of raw term-frequency vectors (all words counted).
///
/// Returns `0.0` when either text has no words.
pub fn term_frequency_cosine(text_a: &str, text_b: &str) -> f32 {
    let tf_a = term_frequencies(text_a);
    let tf_b = term_frequencies(text_b);
    if tf_a.is_empty() || tf_b.is_empty() {
        return 0.0;
    }

    let dot: f32 = tf_a
        .iter()
        .filter_map(|(term, &a)| tf_b.get(term).map(|&b| a * b))
        .sum();
    let norm_a = tf_a.values().map(|v| v * v).sum::<f32>().sqrt();
    let norm_b = tf_b.values().map(|v| v * v).sum::<f32>().sqrt();

    (dot / (norm_a * norm_b)).clamp(0.0, 1.0)
}

fn term_frequencies(text: &str) -> HashMap<String, f32> {
    let mut counts = HashMap::new();
    for word in words(text) {
        *counts.entry(word).or_insert(0.0) += 1.0;
    }
    counts
}

/// Fraction of `query`'s content words that also occur in `candidate`.
///
/// `0.0` when `query` has no content words.
pub fn content_recall(query: &str, candidate: &str) -> f32 {
    let query_words = content_words(query);
    if query_words.is_empty() {
        return 0.0;
    }
    let candidate_words = content_words(candidate);
    let matches = query_words.intersection(&candidate_words).count();
    matches as f32 / query_words.len() as f32
}

/// ROUGE-L F-measure: longest common word subsequence of `reference` and `hypothesis`.
pub fn rouge_l(reference: &str, hypothesis: &str) -> f32 {
    let reference: Vec<String> = words(reference).collect();
    let hypothesis: Vec<String> = words(hypothesis).collect();
    if reference.is_empty() || hypothesis.is_empty() {
        return 0.0;
    }

    // Single-row LCS table.
    let mut row = vec![0usize; hypothesis.len() + 1];
    for r in &reference {
        let mut diagonal = 0;
        for (j, h) in hypothesis.iter().enumerate() {
            let above = row[j + 1];
            row[j + 1] = if r == h {
                diagonal + 1
            } else {
                above.max(row[j])
            };
            diagonal = above;
        }
    }
    let lcs = row[hypothesis.len()] as f32;
    if lcs == 0.0 {
        return 0.0;
    }

    let precision = lcs / hypothesis.len() as f32;
    let recall = lcs / reference.len() as f32;
    2.0 * precision * recall / (precision + recall)
}

/// Whether `text` contains a negation cue.
pub fn has_negation(text: &str) -> bool {
    words(text).any(|w| NEGATIONS.contains(&w.as_str()) || w.ends_with("n't"))
}
