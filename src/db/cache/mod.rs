use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;

use crate::error::CacheError;
use crate::models::{Query, ScoredCandidate};

mod macros;
pub mod memory;
pub mod redis_store;

pub use self::memory::MemoryStore;
pub use self::redis_store::{create_redis_client, CacheWriterHandle, RedisStore};

/// Key of a ranked recommendation list
///
/// Built from the category, the case-normalized search term and the region.
/// A non-empty affinity adds its fingerprint so personalised rankings do not
/// leak into anonymous requests.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn for_query(query: &Query) -> Self {
        let term = query
            .search_term()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();

        let mut key = format!("{}:{}:{}", query.category(), term, query.region());
        if !query.affinity().is_empty() {
            key.push('|');
            key.push_str(&query.affinity().fingerprint());
        }
        Self(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Backing store for ranked results
///
/// A `put` replaces the whole entry for a key. Concurrent puts for the same
/// key are allowed; the last one wins.
#[async_trait::async_trait]
pub trait CacheStore: Send + Sync {
    /// Returns the entry for `key` unless it is absent or expired
    async fn get(&self, key: &CacheKey) -> Result<Option<Vec<ScoredCandidate>>, CacheError>;

    /// Stores `value` under `key` for `ttl`
    async fn put(
        &self,
        key: &CacheKey,
        value: &[ScoredCandidate],
        ttl: Duration,
    ) -> Result<(), CacheError>;

    /// Store name for logging
    fn name(&self) -> &'static str;
}

/// Result cache used by the aggregator
///
/// Store failures are logged and degrade to a miss (on read) or a dropped
/// write (on put); they never reach the caller.
#[derive(Clone)]
pub struct Cache {
    store: Arc<dyn CacheStore>,
    ttl: Duration,
}

impl Cache {
    pub fn new(store: Arc<dyn CacheStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// In-process cache bounded to `max_entries`
    pub fn in_memory(ttl: Duration, max_entries: usize) -> Self {
        Self::new(Arc::new(MemoryStore::new(max_entries)), ttl)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn get(&self, key: &CacheKey) -> Option<Vec<ScoredCandidate>> {
        match self.store.get(key).await {
            Ok(Some(value)) => {
                tracing::debug!(key = %key, store = self.store.name(), "Cache hit");
                Some(value)
            }
            Ok(None) => {
                tracing::debug!(key = %key, store = self.store.name(), "Cache miss");
                None
            }
            Err(e) => {
                tracing::warn!(
                    key = %key,
                    store = self.store.name(),
                    error = %e,
                    "Cache read failed, treating as miss"
                );
                None
            }
        }
    }

    pub async fn put(&self, key: &CacheKey, value: &[ScoredCandidate]) {
        if let Err(e) = self.store.put(key, value, self.ttl).await {
            tracing::warn!(
                key = %key,
                store = self.store.name(),
                error = %e,
                "Cache write failed"
            );
        }
    }
}
