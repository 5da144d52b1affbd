//! `ContentFetcher`: represents the `rss-fetcher` / `link-content-scripter`
//! / `anchor-assigner` family — content acquisition that happens upstream of
//! the text stream this dispatcher consumes. Fetching is an explicit
//! non-goal of the dispatcher itself (§1); this trait exists only so a host
//! assembling a full pipeline has a typed seam for it.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::CollaboratorError;

#[async_trait]
pub trait ContentFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, CollaboratorError>;
}

/// In-memory fake serving fixed content for a configured set of URLs.
#[cfg(any(test, feature = "test-util"))]
pub struct FakeContentFetcher {
    pages: HashMap<String, String>,
}

#[cfg(any(test, feature = "test-util"))]
impl FakeContentFetcher {
    pub fn new() -> Self {
        Self { pages: HashMap::new() }
    }

    pub fn with_page(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.pages.insert(url.into(), body.into());
        self
    }
}

#[cfg(any(test, feature = "test-util"))]
impl Default for FakeContentFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(any(test, feature = "test-util"))]
#[async_trait]
impl ContentFetcher for FakeContentFetcher {
    async fn fetch(&self, url: &str) -> Result<String, CollaboratorError> {
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| CollaboratorError::Network(format!("no fake content registered for {url}")))
    }
}
