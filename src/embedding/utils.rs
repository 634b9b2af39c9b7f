use std::io;
use std::path::Path;

use tokenizers::{Tokenizer, TruncationParams};

/// Required files inside a local model directory.
pub const CONFIG_FILE: &str = "config.json";
pub const WEIGHTS_FILE: &str = "model.safetensors";
pub const TOKENIZER_FILE: &str = "tokenizer.json";

/// Loads `tokenizer.json` from `model_dir` with truncation at `max_len` tokens.
///
/// Pair inputs (claim, evidence) longer than the model window are truncated rather
/// than rejected.
pub fn load_tokenizer(model_dir: &Path, max_len: usize) -> io::Result<Tokenizer> {
    let mut tokenizer =
        Tokenizer::from_file(model_dir.join(TOKENIZER_FILE)).map_err(io::Error::other)?;

    let truncation = TruncationParams {
        max_length: max_len,
        ..Default::default()
    };

    tokenizer
        .with_truncation(Some(truncation))
        .map_err(|e| io::Error::other(format!("Failed to configure truncation: {}", e)))?;

    Ok(tokenizer)
}

/// Returns the first required file missing from `model_dir`, if any.
pub fn missing_model_file(model_dir: &Path) -> Option<&'static str> {
    [CONFIG_FILE, WEIGHTS_FILE, TOKENIZER_FILE]
        .into_iter()
        .find(|name| !model_dir.join(name).exists())
}

/// Cosine similarity of two dense vectors; `0.0` for mismatched or zero vectors.
#[inline]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let (dot, norm_a_sq, norm_b_sq) = a
        .iter()
        .zip(b.iter())
        .fold((0.0f32, 0.0f32, 0.0f32), |(dot, na, nb), (&av, &bv)| {
            (dot + av * bv, na + av * av, nb + bv * bv)
        });

    let norm_a = norm_a_sq.sqrt();
    let norm_b = norm_b_sq.sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}
