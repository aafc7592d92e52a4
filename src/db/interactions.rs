use std::collections::BTreeMap;

use sqlx::PgPool;
use tokio::sync::RwLock;

use crate::error::RecorderError;
use crate::models::{InteractionEvent, InteractionStats};

/// Append-only storage for interaction events
#[async_trait::async_trait]
pub trait InteractionStore: Send + Sync {
    async fn append(&self, event: &InteractionEvent) -> Result<(), RecorderError>;

    async fn stats(&self) -> Result<InteractionStats, RecorderError>;
}

/// Stores interactions in the `user_interactions` table
#[derive(Clone)]
pub struct PgInteractionStore {
    pool: PgPool,
}

impl PgInteractionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl InteractionStore for PgInteractionStore {
    async fn append(&self, event: &InteractionEvent) -> Result<(), RecorderError> {
        sqlx::query(
            r#"
            INSERT INTO user_interactions
                (occurred_at, session_id, category, search_query, region,
                 recommendations, clicked_video_id, clicked_position)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(event.timestamp)
        .bind(&event.session_id)
        .bind(event.category.as_str())
        .bind(&event.search_term)
        .bind(&event.region)
        .bind(&event.shown_candidate_ids)
        .bind(&event.clicked_candidate_id)
        .bind(event.clicked_position)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn stats(&self) -> Result<InteractionStats, RecorderError> {
        let (total_interactions, total_clicks): (i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*), COUNT(clicked_video_id)
            FROM user_interactions
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        let rows: Vec<(String, i64)> = sqlx::query_as(
            r#"
            SELECT category, COUNT(*)
            FROM user_interactions
            GROUP BY category
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(InteractionStats::new(
            total_interactions,
            total_clicks,
            rows.into_iter().collect(),
        ))
    }
}

/// Keeps interactions in process memory; used without a database and in tests
#[derive(Default)]
pub struct MemoryInteractionStore {
    events: RwLock<Vec<InteractionEvent>>,
}

impl MemoryInteractionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn events(&self) -> Vec<InteractionEvent> {
        self.events.read().await.clone()
    }
}

#[async_trait::async_trait]
impl InteractionStore for MemoryInteractionStore {
    async fn append(&self, event: &InteractionEvent) -> Result<(), RecorderError> {
        self.events.write().await.push(event.clone());
        Ok(())
    }

    async fn stats(&self) -> Result<InteractionStats, RecorderError> {
        let events = self.events.read().await;

        let total_clicks = events.iter().filter(|event| event.is_click()).count();
        let mut breakdown: BTreeMap<String, i64> = BTreeMap::new();
        for event in events.iter() {
            *breakdown.entry(event.category.to_string()).or_default() += 1;
        }

        Ok(InteractionStats::new(
            events.len() as i64,
            total_clicks as i64,
            breakdown,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;
    use chrono::Utc;
    use tokio_test::assert_ok;

    fn event(category: Category, clicked: Option<&str>) -> InteractionEvent {
        InteractionEvent {
            session_id: "session-1".to_string(),
            category,
            search_term: "inception".to_string(),
            region: "US".to_string(),
            shown_candidate_ids: vec!["tmdb:movie:1".to_string(), "youtube:abc".to_string()],
            clicked_candidate_id: clicked.map(str::to_string),
            clicked_position: clicked.map(|_| 0),
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_memory_store_stats() {
        let store = MemoryInteractionStore::new();
        assert_ok!(store.append(&event(Category::Movie, None)).await);
        assert_ok!(store.append(&event(Category::Movie, Some("tmdb:movie:1"))).await);
        assert_ok!(store.append(&event(Category::ViralClip, None)).await);
        assert_ok!(store.append(&event(Category::ViralClip, Some("youtube:abc"))).await);

        let stats = store.stats().await.unwrap();
        assert_eq!(stats.total_interactions, 4);
        assert_eq!(stats.total_clicks, 2);
        assert_eq!(stats.click_through_rate, 50.0);
        assert_eq!(stats.category_breakdown["movie"], 2);
        assert_eq!(stats.category_breakdown["viral_clip"], 2);
    }

    #[tokio::test]
    async fn test_memory_store_empty_stats() {
        let store = MemoryInteractionStore::new();
        let stats = store.stats().await.unwrap();
        assert_eq!(stats, InteractionStats::default());
    }
}
