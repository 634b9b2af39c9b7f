use std::time::Duration;
use thiserror::Error;

use crate::embedding::EmbeddingError;

/// Failure of a single capability call.
///
/// Callers treat these as recoverable per item: the affected sentence or unit is
/// skipped and processing continues.
#[derive(Debug, Error)]
pub enum CapabilityError {
    #[error("{capability} request failed: {reason}")]
    Request {
        capability: &'static str,
        reason: String,
    },

    #[error("{capability} returned status {status}")]
    Status { capability: &'static str, status: u16 },

    #[error("{capability} returned a malformed response: {reason}")]
    MalformedResponse {
        capability: &'static str,
        reason: String,
    },

    #[error("{capability} timed out after {timeout:?}")]
    Timeout {
        capability: &'static str,
        timeout: Duration,
    },

    #[error("{capability} inference failed: {reason}")]
    Inference {
        capability: &'static str,
        reason: String,
    },
}

impl CapabilityError {
    /// Name of the capability that failed.
    pub fn capability(&self) -> &'static str {
        match self {
            CapabilityError::Request { capability, .. }
            | CapabilityError::Status { capability, .. }
            | CapabilityError::MalformedResponse { capability, .. }
            | CapabilityError::Timeout { capability, .. }
            | CapabilityError::Inference { capability, .. } => capability,
        }
    }

    pub(crate) fn inference(capability: &'static str, err: EmbeddingError) -> Self {
        CapabilityError::Inference {
            capability,
            reason: err.to_string(),
        }
    }
}

pub type CapabilityResult<T> = Result<T, CapabilityError>;
