use std::error::Error as _;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url, redirect};
use scraper::{Html, Selector};
use tracing::{debug, info};

use crate::constants::{DEFAULT_FETCH_TIMEOUT, FETCH_USER_AGENT, MAX_FETCH_REDIRECTS};
use crate::verification::normalize_whitespace;

use super::error::SourceError;
use super::policy::SourcePolicy;

#[async_trait]
/// Retrieves a source document as an ordered list of paragraphs.
pub trait DocumentFetcher: Send + Sync {
    /// Fetches `url` and returns its paragraph texts in document order.
    async fn fetch_paragraphs(&self, url: &Url) -> Result<Vec<String>, SourceError>;
}

/// Fetches pages over HTTP and extracts the text of their `<p>` elements.
///
/// Every redirect hop and the final URL are checked against the [`SourcePolicy`];
/// a refused hop fails the fetch with [`SourceError::Disallowed`].
#[derive(Debug, Clone)]
pub struct HttpDocumentFetcher {
    http: Client,
    policy: SourcePolicy,
    timeout: Duration,
}

impl HttpDocumentFetcher {
    pub fn new(timeout: Duration, policy: SourcePolicy) -> Result<Self, SourceError> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(FETCH_USER_AGENT)
            .redirect(redirect_policy(policy.clone()))
            .build()
            .map_err(|e| SourceError::Client {
                reason: e.to_string(),
            })?;

        Ok(Self {
            http,
            policy,
            timeout,
        })
    }

    pub fn with_default_timeout() -> Result<Self, SourceError> {
        Self::new(DEFAULT_FETCH_TIMEOUT, SourcePolicy::default())
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn policy(&self) -> &SourcePolicy {
        &self.policy
    }

    fn map_transport_error(&self, url: &Url, err: reqwest::Error) -> SourceError {
        if let Some(refused) = refused_redirect(&err) {
            refused
        } else if err.is_timeout() {
            SourceError::Timeout {
                url: url.to_string(),
                timeout: self.timeout,
            }
        } else {
            SourceError::Fetch {
                url: url.to_string(),
                reason: err.to_string(),
            }
        }
    }
}

#[async_trait]
impl DocumentFetcher for HttpDocumentFetcher {
    async fn fetch_paragraphs(&self, url: &Url) -> Result<Vec<String>, SourceError> {
        debug!(url = %url, "Fetching source document");
        self.policy.check(url.as_str())?;

        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| self.map_transport_error(url, e))?;

        // Hops were vetted by the redirect policy; the landing URL must pass as well.
        self.policy.check(response.url().as_str())?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| self.map_transport_error(url, e))?;

        let paragraphs = extract_paragraphs(&body)?;
        info!(url = %url, paragraphs = paragraphs.len(), "Fetched source document");
        Ok(paragraphs)
    }
}

/// Follows at most [`MAX_FETCH_REDIRECTS`] hops, each of which must pass `policy`.
fn redirect_policy(policy: SourcePolicy) -> redirect::Policy {
    redirect::Policy::custom(move |attempt| {
        if attempt.previous().len() >= MAX_FETCH_REDIRECTS {
            return attempt.error(format!(
                "too many redirects (limit {MAX_FETCH_REDIRECTS})"
            ));
        }
        match policy.check(attempt.url().as_str()) {
            Ok(_) => attempt.follow(),
            Err(refused) => attempt.error(refused),
        }
    })
}

/// The policy violation that aborted a redirect, if that is what `err` carries.
fn refused_redirect(err: &reqwest::Error) -> Option<SourceError> {
    let mut source = err.source();
    while let Some(inner) = source {
        if let Some(SourceError::Disallowed { url, reason }) = inner.downcast_ref::<SourceError>()
        {
            return Some(SourceError::Disallowed {
                url: url.clone(),
                reason: format!("redirect refused: {reason}"),
            });
        }
        source = inner.source();
    }
    None
}

/// Whitespace-normalised text of every non-empty `<p>` element, in order.
pub fn extract_paragraphs(html: &str) -> Result<Vec<String>, SourceError> {
    let selector = Selector::parse("p").map_err(|e| SourceError::Parse {
        reason: format!("{:?}", e),
    })?;

    let document = Html::parse_document(html);
    Ok(document
        .select(&selector)
        .map(|p| normalize_whitespace(&p.text().collect::<String>()))
        .filter(|text| !text.is_empty())
        .collect())
}
