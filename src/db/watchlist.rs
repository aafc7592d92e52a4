use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::RwLock;

use crate::models::{Candidate, WatchlistItem};

/// Per-session saved titles
#[async_trait::async_trait]
pub trait WatchlistStore: Send + Sync {
    /// Items saved by `session_id`, oldest first
    async fn get(&self, session_id: &str) -> Vec<WatchlistItem>;

    /// Saves `candidate`, replacing an existing item with the same ID
    async fn add(&self, session_id: &str, candidate: Candidate) -> WatchlistItem;

    /// Removes the item with `item_id`; returns whether it existed
    async fn remove(&self, session_id: &str, item_id: &str) -> bool;
}

/// Watchlists kept in process memory
#[derive(Default)]
pub struct MemoryWatchlist {
    sessions: RwLock<HashMap<String, Vec<WatchlistItem>>>,
}

impl MemoryWatchlist {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl WatchlistStore for MemoryWatchlist {
    async fn get(&self, session_id: &str) -> Vec<WatchlistItem> {
        self.sessions
            .read()
            .await
            .get(session_id)
            .cloned()
            .unwrap_or_default()
    }

    async fn add(&self, session_id: &str, candidate: Candidate) -> WatchlistItem {
        let item = WatchlistItem {
            candidate,
            added_at: Utc::now(),
        };

        let mut sessions = self.sessions.write().await;
        let items = sessions.entry(session_id.to_string()).or_default();
        items.retain(|existing| existing.id() != item.id());
        items.push(item.clone());

        item
    }

    async fn remove(&self, session_id: &str, item_id: &str) -> bool {
        let mut sessions = self.sessions.write().await;
        let Some(items) = sessions.get_mut(session_id) else {
            return false;
        };

        let before = items.len();
        items.retain(|item| item.id() != item_id);
        let removed = items.len() != before;

        if items.is_empty() {
            sessions.remove(session_id);
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Platform;

    fn candidate(id: &str, title: &str) -> Candidate {
        Candidate::new(id, title, Platform::Netflix, "https://www.netflix.com/browse")
    }

    #[tokio::test]
    async fn test_add_get_remove() {
        let watchlist = MemoryWatchlist::new();
        watchlist.add("s1", candidate("tmdb:movie:1", "Heat")).await;
        watchlist.add("s1", candidate("tmdb:movie:2", "Ronin")).await;

        let items = watchlist.get("s1").await;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id(), "tmdb:movie:1");

        assert!(watchlist.remove("s1", "tmdb:movie:1").await);
        assert!(!watchlist.remove("s1", "tmdb:movie:1").await);
        assert_eq!(watchlist.get("s1").await.len(), 1);
    }

    #[tokio::test]
    async fn test_add_replaces_same_id() {
        let watchlist = MemoryWatchlist::new();
        watchlist.add("s1", candidate("tmdb:movie:1", "Heat")).await;
        watchlist.add("s1", candidate("tmdb:movie:1", "Heat (1995)")).await;

        let items = watchlist.get("s1").await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].candidate.title, "Heat (1995)");
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let watchlist = MemoryWatchlist::new();
        watchlist.add("s1", candidate("tmdb:movie:1", "Heat")).await;

        assert!(watchlist.get("s2").await.is_empty());
        assert!(!watchlist.remove("s2", "tmdb:movie:1").await);
    }
}
