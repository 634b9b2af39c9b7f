use std::path::PathBuf;

use crate::constants::DEFAULT_MAX_SEQ_LEN;
use crate::embedding::error::EmbeddingError;

#[derive(Debug, Clone)]
/// Configuration for [`NliClassifier`](super::NliClassifier).
pub struct ClassifierConfig {
    /// Model directory. `None` selects the lexical stub.
    pub model_path: Option<PathBuf>,
    /// Max tokens of the (claim, evidence) pair.
    pub max_seq_len: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            model_path: None,
            max_seq_len: DEFAULT_MAX_SEQ_LEN,
        }
    }
}

impl ClassifierConfig {
    pub fn new<P: Into<PathBuf>>(model_path: P) -> Self {
        Self {
            model_path: Some(model_path.into()),
            ..Default::default()
        }
    }

    pub fn stub() -> Self {
        Self::default()
    }

    pub fn with_max_seq_len(mut self, max_seq_len: usize) -> Self {
        self.max_seq_len = max_seq_len;
        self
    }

    pub fn validate(&self) -> Result<(), EmbeddingError> {
        if self.max_seq_len == 0 {
            return Err(EmbeddingError::InvalidConfig {
                reason: "max_seq_len must be greater than zero".to_string(),
            });
        }

        if let Some(ref path) = self.model_path
            && path.as_os_str().is_empty()
        {
            return Err(EmbeddingError::InvalidConfig {
                reason: "model_path cannot be empty when provided".to_string(),
            });
        }

        Ok(())
    }
}
