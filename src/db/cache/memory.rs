use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;

use super::{CacheKey, CacheStore};
use crate::error::CacheError;
use crate::models::ScoredCandidate;

struct Entry {
    value: Vec<ScoredCandidate>,
    expires_at: Instant,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        now > self.expires_at
    }
}

/// In-process TTL store
///
/// Expired entries are dropped lazily on lookup. When the store is full a new
/// key evicts expired entries first, then the entry closest to expiry.
pub struct MemoryStore {
    entries: RwLock<HashMap<CacheKey, Entry>>,
    max_entries: usize,
}

impl MemoryStore {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            max_entries: max_entries.max(1),
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    fn make_room(entries: &mut HashMap<CacheKey, Entry>, max_entries: usize, now: Instant) {
        if entries.len() < max_entries {
            return;
        }

        entries.retain(|_, entry| !entry.is_expired(now));

        while entries.len() >= max_entries {
            let Some(oldest) = entries
                .iter()
                .min_by_key(|(_, entry)| entry.expires_at)
                .map(|(key, _)| key.clone())
            else {
                break;
            };
            tracing::debug!(key = %oldest, "Evicting cache entry at capacity");
            entries.remove(&oldest);
        }
    }
}

#[async_trait::async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &CacheKey) -> Result<Option<Vec<ScoredCandidate>>, CacheError> {
        let now = Instant::now();
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if !entry.is_expired(now) => return Ok(Some(entry.value.clone())),
                Some(_) => {}
                None => return Ok(None),
            }
        }

        // Re-check under the write lock: a fresh put may have landed in between
        let mut entries = self.entries.write().await;
        if entries.get(key).is_some_and(|entry| entry.is_expired(now)) {
            entries.remove(key);
        }
        Ok(None)
    }

    async fn put(
        &self,
        key: &CacheKey,
        value: &[ScoredCandidate],
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;

        if !entries.contains_key(key) {
            Self::make_room(&mut entries, self.max_entries, now);
        }

        entries.insert(
            key.clone(),
            Entry {
                value: value.to_vec(),
                expires_at: now + ttl,
            },
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
