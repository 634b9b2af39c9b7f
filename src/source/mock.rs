//! Scripted document fetcher for network-free tests.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::Url;

use super::error::SourceError;
use super::fetcher::DocumentFetcher;

/// Serves registered pages by URL; unknown URLs answer 404.
#[derive(Default)]
pub struct MockDocumentFetcher {
    pages: HashMap<String, Vec<String>>,
    failing: HashSet<String>,
    calls: Mutex<Vec<String>>,
}

impl MockDocumentFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `paragraphs` for `url` (compared after URL normalisation).
    pub fn with_page(mut self, url: &str, paragraphs: &[&str]) -> Self {
        self.pages.insert(
            normalize(url),
            paragraphs.iter().map(|p| p.to_string()).collect(),
        );
        self
    }

    pub fn failing_on(mut self, url: &str) -> Self {
        self.failing.insert(normalize(url));
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

fn normalize(url: &str) -> String {
    Url::parse(url)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| url.to_string())
}

#[async_trait]
impl DocumentFetcher for MockDocumentFetcher {
    async fn fetch_paragraphs(&self, url: &Url) -> Result<Vec<String>, SourceError> {
        self.calls.lock().push(url.to_string());

        if self.failing.contains(url.as_str()) {
            return Err(SourceError::Fetch {
                url: url.to_string(),
                reason: "scripted failure".to_string(),
            });
        }

        self.pages
            .get(url.as_str())
            .cloned()
            .ok_or_else(|| SourceError::Status {
                url: url.to_string(),
                status: 404,
            })
    }
}
