use thiserror::Error;

#[derive(Debug, Error)]
pub enum VerificationError {
    #[error("invalid verifier configuration: {reason}")]
    InvalidConfig { reason: String },
}
