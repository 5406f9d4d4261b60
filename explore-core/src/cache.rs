//! TTL response cache
//!
//! Memoizes decoded upstream responses keyed by endpoint plus the
//! canonicalized parameter map. Entries expire after a fixed time-to-live
//! and the table is bounded with least-recently-used eviction.
//!
//! Concurrent misses on the same key are not coalesced: both callers fetch
//! and the last insert wins. Errors are never cached.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use moka::policy::EvictionPolicy;
use serde_json::Value;

use crate::config::CacheConfig;
use crate::error::FetchError;
use crate::http::ParamMap;

/// Cache key: endpoint identity plus sorted parameter pairs
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    endpoint: String,
    params: Vec<(String, String)>,
}

impl CacheKey {
    /// Build a key. `params` is a sorted map, so `{a:1,b:2}` and `{b:2,a:1}`
    /// produce the same key.
    pub fn new(endpoint: impl Into<String>, params: &ParamMap) -> Self {
        Self {
            endpoint: endpoint.into(),
            params: params
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }
}

/// Shared response cache
#[derive(Clone)]
pub struct ResponseCache {
    inner: Cache<CacheKey, Arc<Value>>,
}

impl ResponseCache {
    /// Create a cache holding at most `capacity` entries for `ttl` each
    #[must_use]
    pub fn new(capacity: u64, ttl: Duration) -> Self {
        let inner = Cache::builder()
            .max_capacity(capacity)
            .time_to_live(ttl)
            .eviction_policy(EvictionPolicy::lru())
            .build();
        Self { inner }
    }

    #[must_use]
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.capacity, config.ttl())
    }

    /// Look up a live entry
    pub async fn get(&self, key: &CacheKey) -> Option<Arc<Value>> {
        self.inner.get(key).await
    }

    /// Publish a value, replacing any previous one
    pub async fn insert(&self, key: CacheKey, value: Arc<Value>) {
        self.inner.insert(key, value).await;
    }

    /// Return the cached value for `key`, or run `fetch` and publish its result.
    ///
    /// A failed fetch is returned to the caller and leaves the cache untouched.
    /// If the returned future is dropped mid-fetch nothing is published.
    pub async fn get_or_fetch<F, Fut>(&self, key: CacheKey, fetch: F) -> Result<Arc<Value>, FetchError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, FetchError>>,
    {
        if let Some(value) = self.inner.get(&key).await {
            tracing::debug!(endpoint = %key.endpoint, "Response cache hit");
            return Ok(value);
        }

        tracing::debug!(endpoint = %key.endpoint, "Response cache miss");
        let value = Arc::new(fetch().await?);
        self.inner.insert(key, value.clone()).await;
        Ok(value)
    }

    /// Approximate number of live entries
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }

    /// Apply pending evictions and expirations
    pub async fn run_pending_tasks(&self) {
        self.inner.run_pending_tasks().await;
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::from_config(&CacheConfig::default())
    }
}
