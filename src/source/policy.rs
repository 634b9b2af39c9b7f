use reqwest::Url;
use tracing::warn;

use crate::constants::{COMMUNITY_PATH_SEGMENT, DEFAULT_BLOCKED_DOMAINS};

use super::error::SourceError;

/// Decides which source URLs may be fetched.
///
/// A URL is refused when its host contains a blocked domain fragment, or when its
/// path has a community segment (`/r/<name>`). Only `http` and `https` are fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePolicy {
    blocked_domains: Vec<String>,
}

impl Default for SourcePolicy {
    fn default() -> Self {
        Self::new(DEFAULT_BLOCKED_DOMAINS.iter().map(|d| d.to_string()))
    }
}

impl SourcePolicy {
    pub fn new<I, S>(blocked_domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            blocked_domains: blocked_domains
                .into_iter()
                .map(|d| d.into().trim().to_lowercase())
                .filter(|d| !d.is_empty())
                .collect(),
        }
    }

    pub fn blocked_domains(&self) -> &[String] {
        &self.blocked_domains
    }

    /// Parses `raw` and applies the policy. Returns the URL to fetch.
    pub fn check(&self, raw: &str) -> Result<Url, SourceError> {
        let url = Url::parse(raw.trim()).map_err(|e| SourceError::InvalidUrl {
            url: raw.to_string(),
            reason: e.to_string(),
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(SourceError::InvalidUrl {
                url: raw.to_string(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }

        let host = url.host_str().unwrap_or_default().to_lowercase();
        if let Some(domain) = self
            .blocked_domains
            .iter()
            .find(|domain| host.contains(domain.as_str()))
        {
            warn!(url = %url, domain = %domain, "Refusing blocked source domain");
            return Err(SourceError::Disallowed {
                url: url.to_string(),
                reason: format!("host matches blocked domain '{domain}'"),
            });
        }

        let community = url
            .path_segments()
            .is_some_and(|mut segments| segments.any(|s| s == COMMUNITY_PATH_SEGMENT));
        if community {
            warn!(url = %url, "Refusing community-content source");
            return Err(SourceError::Disallowed {
                url: url.to_string(),
                reason: "community-content path".to_string(),
            });
        }

        Ok(url)
    }
}
