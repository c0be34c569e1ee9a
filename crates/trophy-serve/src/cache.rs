//! Cache-aside storage of upstream profiles.
//!
//! [`ProfileFetcher`] checks a [`CacheStore`] before calling the
//! [`UpstreamClient`], and writes successful upstream results back.
//!
//! ## Key Strategy
//!
//! Keys are `"<schema-version>-<username>"`, e.g. `v1-octocat`. Bumping
//! [`CACHE_SCHEMA_VERSION`] orphans every old entry without deleting it.
//!
//! ## Concurrency
//!
//! There is no mutual exclusion around the miss path: two concurrent requests
//! for the same uncached username both call upstream and both write the key.
//! The values are equal, so last-write-wins is harmless, only redundant.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;

use crate::error::{CacheError, ServiceError};
use crate::upstream::{ProfileData, UpstreamClient};

/// Current cache key namespace.
pub const CACHE_SCHEMA_VERSION: &str = "v1";

/// String key-value store backing the profile cache.
///
/// TTL and eviction, if any, belong to the implementation.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Read the value stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: String) -> Result<(), CacheError>;
}

/// In-process store backed by moka.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Cache<String, String>,
}

impl MemoryStore {
    /// Create a store holding at most `capacity` entries for `ttl` each.
    pub fn new(capacity: u64, ttl: Duration) -> Self {
        let inner = Cache::builder()
            .max_capacity(capacity)
            .time_to_live(ttl)
            .build();
        Self { inner }
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.inner.get(key).await)
    }

    async fn set(&self, key: &str, value: String) -> Result<(), CacheError> {
        self.inner.insert(key.to_string(), value).await;
        Ok(())
    }
}

/// Build the cache key for `username` under `schema_version`.
pub fn cache_key(schema_version: &str, username: &str) -> String {
    format!("{schema_version}-{username}")
}

/// Cache-aside orchestration of a [`CacheStore`] and an [`UpstreamClient`].
#[derive(Clone)]
pub struct ProfileFetcher {
    store: Arc<dyn CacheStore>,
    upstream: Arc<dyn UpstreamClient>,
    schema_version: String,
}

impl ProfileFetcher {
    /// Create a fetcher using the current [`CACHE_SCHEMA_VERSION`].
    pub fn new(store: Arc<dyn CacheStore>, upstream: Arc<dyn UpstreamClient>) -> Self {
        Self::with_schema_version(store, upstream, CACHE_SCHEMA_VERSION)
    }

    /// Create a fetcher using an explicit key namespace.
    pub fn with_schema_version(
        store: Arc<dyn CacheStore>,
        upstream: Arc<dyn UpstreamClient>,
        schema_version: &str,
    ) -> Self {
        Self {
            store,
            upstream,
            schema_version: schema_version.to_string(),
        }
    }

    /// Profile for `username`, from cache when a usable entry exists.
    ///
    /// Only successful upstream results are written back; a [`ServiceError`]
    /// is returned untouched and never stored.
    pub async fn fetch(&self, username: &str) -> Result<ProfileData, ServiceError> {
        let key = cache_key(&self.schema_version, username);

        let cached = self.read(&key).await;
        if !cached.is_empty() {
            tracing::debug!(key = %key, "profile cache hit");
            return Ok(cached);
        }

        tracing::debug!(key = %key, "profile cache miss, fetching upstream");
        let profile = self.upstream.fetch_profile(username).await?;

        if let Err(e) = self.write(&key, &profile).await {
            tracing::warn!(key = %key, error = %e, "failed to store profile");
        }

        Ok(profile)
    }

    /// Read an entry. Absent, unreadable, or corrupt entries are empty.
    async fn read(&self, key: &str) -> ProfileData {
        self.load(key).await.unwrap_or_else(|e| {
            tracing::warn!(key = %key, error = %e, "cache read failed, treating as miss");
            ProfileData::default()
        })
    }

    async fn load(&self, key: &str) -> Result<ProfileData, CacheError> {
        match self.store.get(key).await? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(ProfileData::default()),
        }
    }

    async fn write(&self, key: &str, profile: &ProfileData) -> Result<(), CacheError> {
        let json = serde_json::to_string(profile)?;
        self.store.set(key, json).await
    }
}
