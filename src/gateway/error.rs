use axum::{
    Json,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::constants::STATUS_HEADER;
use crate::source::SourceError;
use crate::verification::VerificationError;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("disallowed source: {0}")]
    DisallowedSource(String),

    #[error("source fetch failed: {0}")]
    FetchFailed(String),

    #[error("model capability failed: {0}")]
    CapabilityFailed(String),

    #[error("internal error: {0}")]
    InternalError(String),
}

#[derive(serde::Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::DisallowedSource(_) => StatusCode::FORBIDDEN,
            GatewayError::FetchFailed(_) | GatewayError::CapabilityFailed(_) => {
                StatusCode::BAD_GATEWAY
            }
            GatewayError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Value of the status header.
    pub fn status_tag(&self) -> &'static str {
        match self {
            GatewayError::InvalidRequest(_) => "invalid_request",
            GatewayError::DisallowedSource(_) => "disallowed_source",
            GatewayError::FetchFailed(_) => "fetch_error",
            GatewayError::CapabilityFailed(_) => "capability_error",
            GatewayError::InternalError(_) => "internal_error",
        }
    }
}

impl From<VerificationError> for GatewayError {
    fn from(err: VerificationError) -> Self {
        GatewayError::InternalError(err.to_string())
    }
}

impl From<SourceError> for GatewayError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::InvalidUrl { .. } => GatewayError::InvalidRequest(err.to_string()),
            SourceError::Disallowed { .. } => GatewayError::DisallowedSource(err.to_string()),
            SourceError::Client { .. } => GatewayError::InternalError(err.to_string()),
            SourceError::Fetch { .. }
            | SourceError::Timeout { .. }
            | SourceError::Status { .. }
            | SourceError::Parse { .. } => GatewayError::FetchFailed(err.to_string()),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let mut headers = HeaderMap::new();
        headers.insert(STATUS_HEADER, HeaderValue::from_static(self.status_tag()));

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: status.as_u16(),
        });

        (status, headers, body).into_response()
    }
}
