//! Reference-data lookups backing the drop-down fields
//!
//! Division and state names are only valid if the reference-data service
//! knows them. The lookup is injected as a trait object so handlers and tests
//! can swap the HTTP client for an in-memory set.

use async_trait::async_trait;
use moka::future::Cache as MokaCache;
use shared::ReferenceCategory;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::metrics;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(String),
    #[error("reference service returned HTTP {0}")]
    Status(u16),
    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
    #[error("Network timeout")]
    Timeout,
}

/// Existence check against a reference-data collection
#[async_trait]
pub trait ReferenceLookup: Send + Sync {
    /// `Ok(true)` when at least one record matches `value` exactly
    async fn exists(&self, category: ReferenceCategory, value: &str) -> Result<bool, LookupError>;
}

/// Client for the reference-data service.
///
/// `GET {base}/divisions?division_name=X` and `GET {base}/states?state_name=X`
/// return a JSON array of matching records; an empty array means unknown.
pub struct HttpReferenceLookup {
    base_url: String,
    client: reqwest::Client,
    request_timeout: Duration,
}

impl HttpReferenceLookup {
    pub fn new(base_url: impl Into<String>, request_timeout: Duration) -> Self {
        let client = reqwest::ClientBuilder::new()
            .timeout(request_timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
            request_timeout,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn fetch_matches(
        &self,
        category: ReferenceCategory,
        value: &str,
    ) -> Result<Vec<serde_json::Value>, LookupError> {
        let url = format!("{}/{}", self.base_url, category.path());
        debug!(%url, category = %category, value, "querying reference data");

        let response = self
            .client
            .get(&url)
            .query(&[(category.query_param(), value)])
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LookupError::Timeout
                } else {
                    LookupError::RequestFailed(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(LookupError::Status(response.status().as_u16()));
        }

        response.json::<Vec<serde_json::Value>>().await.map_err(|e| {
            if e.is_timeout() {
                LookupError::Timeout
            } else {
                LookupError::InvalidResponse(format!("expected a JSON array: {}", e))
            }
        })
    }
}

#[async_trait]
impl ReferenceLookup for HttpReferenceLookup {
    async fn exists(&self, category: ReferenceCategory, value: &str) -> Result<bool, LookupError> {
        let result = self.fetch_matches(category, value).await;
        let outcome = match &result {
            Ok(matches) if matches.is_empty() => "missing",
            Ok(_) => "found",
            Err(_) => "error",
        };
        metrics::observe_reference_lookup(category.as_str(), outcome);
        result.map(|matches| !matches.is_empty())
    }
}

/// Remembers positive answers from an inner lookup for a fixed TTL.
///
/// Misses and failures always go back to the inner lookup.
pub struct CachedReferenceLookup {
    inner: Arc<dyn ReferenceLookup>,
    known: MokaCache<(ReferenceCategory, String), ()>,
}

impl CachedReferenceLookup {
    pub fn new(inner: Arc<dyn ReferenceLookup>, ttl: Duration, capacity: u64) -> Self {
        Self {
            inner,
            known: MokaCache::builder()
                .max_capacity(capacity)
                .time_to_live(ttl)
                .build(),
        }
    }
}

#[async_trait]
impl ReferenceLookup for CachedReferenceLookup {
    async fn exists(&self, category: ReferenceCategory, value: &str) -> Result<bool, LookupError> {
        let key = (category, value.to_string());
        if self.known.get(&key).await.is_some() {
            metrics::observe_reference_lookup(category.as_str(), "cached");
            return Ok(true);
        }

        let found = self.inner.exists(category, value).await?;
        if found {
            self.known.insert(key, ()).await;
        }
        Ok(found)
    }
}

/// Fixed in-memory reference data
#[derive(Debug, Clone, Default)]
pub struct StaticReferenceLookup {
    entries: HashMap<ReferenceCategory, HashSet<String>>,
}

impl StaticReferenceLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<I, S>(mut self, category: ReferenceCategory, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entries
            .entry(category)
            .or_default()
            .extend(values.into_iter().map(Into::into));
        self
    }
}

#[async_trait]
impl ReferenceLookup for StaticReferenceLookup {
    async fn exists(&self, category: ReferenceCategory, value: &str) -> Result<bool, LookupError> {
        Ok(self
            .entries
            .get(&category)
            .map_or(false, |values| values.contains(value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingLookup {
        calls: AtomicUsize,
        answer: bool,
    }

    #[async_trait]
    impl ReferenceLookup for CountingLookup {
        async fn exists(&self, _: ReferenceCategory, _: &str) -> Result<bool, LookupError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.answer)
        }
    }

    #[tokio::test]
    async fn test_static_lookup() {
        let lookup = StaticReferenceLookup::new()
            .with(ReferenceCategory::Division, ["Engineering", "Finance"])
            .with(ReferenceCategory::State, ["Kerala"]);

        assert!(lookup.exists(ReferenceCategory::Division, "Finance").await.unwrap());
        assert!(!lookup.exists(ReferenceCategory::Division, "finance").await.unwrap());
        assert!(!lookup.exists(ReferenceCategory::State, "Finance").await.unwrap());
        assert!(lookup.exists(ReferenceCategory::State, "Kerala").await.unwrap());
    }

    #[tokio::test]
    async fn test_cached_lookup_reuses_positive_answers() {
        let inner = Arc::new(CountingLookup {
            calls: AtomicUsize::new(0),
            answer: true,
        });
        let cached = CachedReferenceLookup::new(inner.clone(), Duration::from_secs(60), 100);

        assert!(cached.exists(ReferenceCategory::State, "Goa").await.unwrap());
        assert!(cached.exists(ReferenceCategory::State, "Goa").await.unwrap());
        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);

        assert!(cached.exists(ReferenceCategory::Division, "Goa").await.unwrap());
        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_cached_lookup_does_not_cache_misses() {
        let inner = Arc::new(CountingLookup {
            calls: AtomicUsize::new(0),
            answer: false,
        });
        let cached = CachedReferenceLookup::new(inner.clone(), Duration::from_secs(60), 100);

        assert!(!cached.exists(ReferenceCategory::State, "Atlantis").await.unwrap());
        assert!(!cached.exists(ReferenceCategory::State, "Atlantis").await.unwrap());
        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_http_lookup_trims_trailing_slash() {
        let lookup = HttpReferenceLookup::new("http://localhost:4000/", Duration::from_secs(1));
        assert_eq!(lookup.base_url(), "http://localhost:4000");
    }
}
