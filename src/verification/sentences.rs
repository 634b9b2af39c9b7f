use unicode_segmentation::UnicodeSegmentation;

/// Splits an evidence block on sentence boundaries (UAX #29).
///
/// Sentences are trimmed; empty ones are dropped.
pub fn split_sentences(block: &str) -> Vec<String> {
    block
        .unicode_sentences()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Flattens evidence blocks into their sentences, in order.
pub fn flatten_blocks<S: AsRef<str>>(blocks: &[S]) -> Vec<String> {
    blocks
        .iter()
        .flat_map(|block| split_sentences(block.as_ref()))
        .collect()
}

/// Collapses whitespace runs to a single space and trims. Case is preserved.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
