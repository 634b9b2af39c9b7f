//! HTTP-backed capabilities served by an external model service.
//!
//! Wire format (JSON, `POST`):
//!
//! | Path | Request | Response |
//! |---|---|---|
//! | `/classify` | `{claim, evidence}` | `{label, confidence: {supports, refutes, neutral}}` |
//! | `/source_similarity` | `{question, source}` | `{similarityScore}` |
//! | `/entities` | `{text}` | `{entities: [string]}` |

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::{CapabilityError, CapabilityResult};
use super::types::{BackendKind, Entailment, EntailmentLabel, LabelScores};
use super::{EntailmentClassifier, EntityExtractor, SimilarityScorer};
use crate::constants::DEFAULT_CALL_TIMEOUT;

const CLASSIFY_PATH: &str = "/classify";
const SIMILARITY_PATH: &str = "/source_similarity";
const ENTITIES_PATH: &str = "/entities";

#[derive(Debug, Clone)]
/// Connection settings for [`RemoteModelService`].
pub struct RemoteServiceConfig {
    /// Base URL, e.g. `http://127.0.0.1:5002`.
    pub base_url: String,
    /// Per-call timeout.
    pub timeout: Duration,
}

impl RemoteServiceConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Serialize)]
struct ClassifyRequest<'a> {
    claim: &'a str,
    evidence: &'a str,
}

#[derive(Deserialize)]
struct ClassifyResponse {
    label: String,
    #[serde(default)]
    confidence: LabelScores,
}

#[derive(Serialize)]
struct SimilarityRequest<'a> {
    question: &'a str,
    source: &'a str,
}

#[derive(Deserialize)]
struct SimilarityResponse {
    #[serde(rename = "similarityScore")]
    similarity_score: f32,
}

#[derive(Serialize)]
struct EntitiesRequest<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct EntitiesResponse {
    entities: Vec<String>,
}

/// Client for a model service exposing all three capabilities.
pub struct RemoteModelService {
    http: HttpClient,
    config: RemoteServiceConfig,
}

impl std::fmt::Debug for RemoteModelService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteModelService")
            .field("base_url", &self.config.base_url)
            .field("timeout", &self.config.timeout)
            .finish()
    }
}

impl RemoteModelService {
    pub fn new(config: RemoteServiceConfig) -> CapabilityResult<Self> {
        let http = HttpClient::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| CapabilityError::Request {
                capability: "remote",
                reason: format!("failed to build http client: {e}"),
            })?;

        Ok(Self { http, config })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn post_json<B, R>(
        &self,
        capability: &'static str,
        path: &str,
        body: &B,
    ) -> CapabilityResult<R>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let url = self.endpoint(path);
        debug!(capability, url = %url, "Calling remote capability");

        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| self.map_transport_error(capability, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CapabilityError::Status {
                capability,
                status: status.as_u16(),
            });
        }

        response
            .json::<R>()
            .await
            .map_err(|e| CapabilityError::MalformedResponse {
                capability,
                reason: e.to_string(),
            })
    }

    fn map_transport_error(
        &self,
        capability: &'static str,
        err: reqwest::Error,
    ) -> CapabilityError {
        if err.is_timeout() {
            CapabilityError::Timeout {
                capability,
                timeout: self.config.timeout,
            }
        } else {
            CapabilityError::Request {
                capability,
                reason: err.to_string(),
            }
        }
    }
}

#[async_trait]
impl EntailmentClassifier for RemoteModelService {
    async fn classify(&self, claim: &str, evidence: &str) -> CapabilityResult<Entailment> {
        let response: ClassifyResponse = self
            .post_json(
                "classifier",
                CLASSIFY_PATH,
                &ClassifyRequest { claim, evidence },
            )
            .await?;

        let label = EntailmentLabel::parse(&response.label).ok_or_else(|| {
            CapabilityError::MalformedResponse {
                capability: "classifier",
                reason: format!("unknown label '{}'", response.label),
            }
        })?;

        Ok(Entailment::new(label, response.confidence))
    }

    fn backend(&self) -> BackendKind {
        BackendKind::Remote
    }
}

#[async_trait]
impl SimilarityScorer for RemoteModelService {
    async fn similarity(&self, text_a: &str, text_b: &str) -> CapabilityResult<f32> {
        let response: SimilarityResponse = self
            .post_json(
                "similarity",
                SIMILARITY_PATH,
                &SimilarityRequest {
                    question: text_a,
                    source: text_b,
                },
            )
            .await?;

        if !response.similarity_score.is_finite() {
            return Err(CapabilityError::MalformedResponse {
                capability: "similarity",
                reason: "similarity score is not finite".to_string(),
            });
        }

        Ok(response.similarity_score)
    }

    fn backend(&self) -> BackendKind {
        BackendKind::Remote
    }
}

#[async_trait]
impl EntityExtractor for RemoteModelService {
    async fn extract(&self, text: &str) -> CapabilityResult<Vec<String>> {
        let response: EntitiesResponse = self
            .post_json("entities", ENTITIES_PATH, &EntitiesRequest { text })
            .await?;
        Ok(response.entities)
    }

    fn backend(&self) -> BackendKind {
        BackendKind::Remote
    }
}
