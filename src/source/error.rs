use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("invalid source url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Policy violation; the whole request is rejected.
    #[error("source '{url}' is not allowed: {reason}")]
    Disallowed { url: String, reason: String },

    #[error("failed to fetch '{url}': {reason}")]
    Fetch { url: String, reason: String },

    #[error("fetching '{url}' timed out after {timeout:?}")]
    Timeout { url: String, timeout: Duration },

    #[error("fetching '{url}' returned status {status}")]
    Status { url: String, status: u16 },

    #[error("failed to parse source document: {reason}")]
    Parse { reason: String },

    #[error("failed to build http client: {reason}")]
    Client { reason: String },
}
