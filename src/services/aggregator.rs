use std::sync::Arc;
use std::time::Duration;

use chrono::{Datelike, Utc};

use crate::{
    db::{Cache, CacheKey},
    error::{AppError, AppResult, ProviderError, ProviderResult},
    models::{Candidate, Query, ScoredCandidate, MAX_RESULT_LIMIT},
    services::{
        dedup::merge_candidates,
        providers::CandidateProvider,
        ranker::{seed_affinity, Ranker},
    },
};

/// Recommendation pipeline: cache check, provider fan-out, merge, rank, cache store
///
/// Provider calls run inside the caller's future rather than on spawned tasks,
/// so dropping the request future abandons them before anything is cached.
pub struct Aggregator {
    catalog: Arc<dyn CandidateProvider>,
    videos: Arc<dyn CandidateProvider>,
    ranker: Ranker,
    cache: Cache,
    provider_timeout: Duration,
    /// Number of ranked results kept in the cache, never below the largest request limit
    superset_size: usize,
}

impl Aggregator {
    pub fn new(
        catalog: Arc<dyn CandidateProvider>,
        videos: Arc<dyn CandidateProvider>,
        ranker: Ranker,
        cache: Cache,
        provider_timeout: Duration,
        superset_size: usize,
    ) -> Self {
        Self {
            catalog,
            videos,
            ranker,
            cache,
            provider_timeout,
            superset_size: superset_size.max(MAX_RESULT_LIMIT),
        }
    }

    pub fn ranker(&self) -> &Ranker {
        &self.ranker
    }

    /// Ranked recommendations for `query`, at most `query.result_limit()` long
    ///
    /// Fails with [`AppError::AllProvidersUnavailable`] only when every provider
    /// serving the category fails and nothing is cached for the query.
    pub async fn get_recommendations(&self, query: &Query) -> AppResult<Vec<ScoredCandidate>> {
        let key = CacheKey::for_query(query);
        let mut ranked = crate::cached!(self.cache, key, self.fetch_and_rank(query));

        ranked.truncate(query.result_limit());
        Ok(ranked)
    }

    async fn fetch_and_rank(&self, query: &Query) -> AppResult<Vec<ScoredCandidate>> {
        let started = std::time::Instant::now();

        let (catalog_result, video_result) = tokio::join!(
            self.fetch_if_served(self.catalog.as_ref(), query),
            self.fetch_if_served(self.videos.as_ref(), query),
        );

        let results: Vec<ProviderResult<Vec<Candidate>>> =
            [catalog_result, video_result].into_iter().flatten().collect();

        if results.iter().all(Result::is_err) {
            let errors: Vec<String> = results
                .iter()
                .filter_map(|result| result.as_ref().err())
                .map(ToString::to_string)
                .collect();
            tracing::error!(
                category = %query.category(),
                query = %query.search_term(),
                errors = ?errors,
                "All providers serving the category failed"
            );
            return Err(AppError::AllProvidersUnavailable);
        }

        let candidates: Vec<Candidate> = results.into_iter().flatten().flatten().collect();
        let fetched = candidates.len();

        // Without a session signal, the searched title itself drives affinity
        let seeded = query
            .affinity()
            .is_empty()
            .then(|| seed_affinity(query, &candidates))
            .flatten()
            .map(|seed| query.clone().with_affinity(seed));
        let ranking_query = seeded.as_ref().unwrap_or(query);

        let merged = merge_candidates(candidates);
        let mut ranked = self.ranker.rank(merged, ranking_query, Utc::now().year());
        ranked.truncate(self.superset_size);

        tracing::info!(
            category = %query.category(),
            query = %query.search_term(),
            region = %query.region(),
            fetched,
            ranked = ranked.len(),
            seeded = seeded.is_some(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Recommendations computed"
        );

        Ok(ranked)
    }

    /// Calls `provider` unless it has nothing for the query's category
    async fn fetch_if_served(
        &self,
        provider: &dyn CandidateProvider,
        query: &Query,
    ) -> Option<ProviderResult<Vec<Candidate>>> {
        if !provider.serves(query.category()) {
            tracing::debug!(
                provider = provider.name(),
                category = %query.category(),
                "Provider skipped for category"
            );
            return None;
        }
        Some(self.fetch_from(provider, query).await)
    }

    /// Calls one provider under the per-call timeout, logging a failure
    async fn fetch_from(
        &self,
        provider: &dyn CandidateProvider,
        query: &Query,
    ) -> ProviderResult<Vec<Candidate>> {
        let result = tokio::time::timeout(self.provider_timeout, provider.fetch_candidates(query))
            .await
            .unwrap_or(Err(ProviderError::Timeout));

        match &result {
            Ok(candidates) => {
                tracing::debug!(provider = provider.name(), results = candidates.len(), "Provider returned");
            }
            Err(e) => {
                tracing::warn!(provider = provider.name(), error = %e, "Provider failed");
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Platform};
    use crate::services::providers::MockCandidateProvider;

    fn candidate(id: &str, title: &str, popularity: f64) -> Candidate {
        let mut candidate = Candidate::new(id, title, Platform::Youtube, format!("https://example.com/{}", id));
        candidate.popularity_score = popularity;
        candidate
    }

    fn mock_returning(name: &'static str, candidates: Vec<Candidate>) -> MockCandidateProvider {
        let mut mock = MockCandidateProvider::new();
        mock.expect_fetch_candidates()
            .returning(move |_| Ok(candidates.clone()));
        mock.expect_serves().return_const(true);
        mock.expect_name().return_const(name);
        mock
    }

    fn mock_failing(name: &'static str, times: usize) -> MockCandidateProvider {
        let mut mock = MockCandidateProvider::new();
        mock.expect_fetch_candidates()
            .times(times)
            .returning(|_| Err(ProviderError::Unavailable("connection refused".to_string())));
        mock.expect_serves().return_const(true);
        mock.expect_name().return_const(name);
        mock
    }

    fn aggregator(catalog: MockCandidateProvider, videos: MockCandidateProvider) -> Aggregator {
        Aggregator::new(
            Arc::new(catalog),
            Arc::new(videos),
            Ranker::new(),
            Cache::in_memory(Duration::from_secs(180), 100),
            Duration::from_secs(5),
            50,
        )
    }

    fn query(limit: usize) -> Query {
        Query::new(Category::ShortVideo, "cats", "US", limit).unwrap()
    }

    #[tokio::test]
    async fn test_merges_both_providers() {
        let aggregator = aggregator(
            mock_returning("tmdb", vec![candidate("tmdb:1", "Cats", 10.0)]),
            mock_returning("youtube", vec![candidate("youtube:1", "Funny Cats", 500.0)]),
        );

        let results = aggregator.get_recommendations(&query(10)).await.unwrap();
        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn test_partial_failure_uses_remaining_provider() {
        let aggregator = aggregator(
            mock_failing("tmdb", 1),
            mock_returning(
                "youtube",
                vec![candidate("youtube:1", "Cats", 1.0), candidate("youtube:2", "More Cats", 2.0)],
            ),
        );

        let results = aggregator.get_recommendations(&query(10)).await.unwrap();
        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn test_total_failure_is_not_cached() {
        // Two calls each: the failed computation must not be served from cache
        let aggregator = aggregator(mock_failing("tmdb", 2), mock_failing("youtube", 2));

        for _ in 0..2 {
            let err = aggregator.get_recommendations(&query(10)).await.unwrap_err();
            assert!(matches!(err, AppError::AllProvidersUnavailable));
        }
    }

    #[tokio::test]
    async fn test_cache_hit_skips_providers() {
        let mut catalog = MockCandidateProvider::new();
        catalog
            .expect_fetch_candidates()
            .times(1)
            .returning(|_| Ok(vec![candidate("tmdb:1", "Cats", 10.0)]));
        catalog.expect_serves().return_const(true);
        catalog.expect_name().return_const("tmdb");

        let mut videos = MockCandidateProvider::new();
        videos.expect_fetch_candidates().times(1).returning(|_| Ok(vec![]));
        videos.expect_serves().return_const(true);
        videos.expect_name().return_const("youtube");

        let aggregator = aggregator(catalog, videos);
        let first = aggregator.get_recommendations(&query(10)).await.unwrap();
        let second = aggregator.get_recommendations(&query(10)).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_cached_superset_serves_larger_limit() {
        let many: Vec<Candidate> = (0..30)
            .map(|i| candidate(&format!("youtube:{}", i), &format!("Cats {}", i), i as f64))
            .collect();

        let mut videos = MockCandidateProvider::new();
        videos
            .expect_fetch_candidates()
            .times(1)
            .returning(move |_| Ok(many.clone()));
        videos.expect_serves().return_const(true);
        videos.expect_name().return_const("youtube");

        let aggregator = aggregator(mock_returning("tmdb", vec![]), videos);

        assert_eq!(aggregator.get_recommendations(&query(5)).await.unwrap().len(), 5);
        assert_eq!(aggregator.get_recommendations(&query(25)).await.unwrap().len(), 25);
    }

    #[tokio::test]
    async fn test_superset_never_below_max_limit() {
        let many: Vec<Candidate> = (0..60)
            .map(|i| candidate(&format!("youtube:{}", i), &format!("Cats {}", i), i as f64))
            .collect();

        let mut videos = MockCandidateProvider::new();
        videos
            .expect_fetch_candidates()
            .times(1)
            .returning(move |_| Ok(many.clone()));
        videos.expect_serves().return_const(true);
        videos.expect_name().return_const("youtube");

        // Configured below the largest limit: the first request must not shrink the entry
        let aggregator = Aggregator::new(
            Arc::new(mock_returning("tmdb", vec![])),
            Arc::new(videos),
            Ranker::new(),
            Cache::in_memory(Duration::from_secs(180), 100),
            Duration::from_secs(5),
            10,
        );

        assert_eq!(aggregator.get_recommendations(&query(5)).await.unwrap().len(), 5);
        assert_eq!(
            aggregator.get_recommendations(&query(MAX_RESULT_LIMIT)).await.unwrap().len(),
            MAX_RESULT_LIMIT
        );
    }

    #[tokio::test]
    async fn test_provider_not_serving_category_is_skipped() {
        let mut catalog = MockCandidateProvider::new();
        catalog.expect_fetch_candidates().never();
        catalog
            .expect_serves()
            .returning(|category| matches!(category, Category::Movie | Category::TvShow));
        catalog.expect_name().return_const("tmdb");

        let aggregator = aggregator(catalog, mock_failing("youtube", 2));

        // The only provider with short videos is down: an error, and nothing cached
        for _ in 0..2 {
            let err = aggregator.get_recommendations(&query(10)).await.unwrap_err();
            assert!(matches!(err, AppError::AllProvidersUnavailable));
        }
    }

    #[tokio::test]
    async fn test_searched_title_seeds_affinity() {
        let mut searched = candidate("tmdb:movie:27205", "Inception", 80.0);
        searched.director_name = Some("Christopher Nolan".to_string());

        let mut related = candidate("tmdb:movie:157336", "Interstellar", 50.0);
        related.director_name = Some("Christopher Nolan".to_string());
        let unrelated = candidate("tmdb:movie:1", "Paddington", 50.0);

        let aggregator = aggregator(
            mock_returning("tmdb", vec![searched, unrelated, related]),
            mock_returning("youtube", vec![]),
        );
        let query = Query::new(Category::Movie, "inception", "US", 10).unwrap();

        let results = aggregator.get_recommendations(&query).await.unwrap();
        let ids: Vec<&str> = results.iter().map(|r| r.candidate.id.as_str()).collect();
        assert_eq!(ids, vec!["tmdb:movie:27205", "tmdb:movie:157336", "tmdb:movie:1"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_provider_times_out() {
        struct Stalled;

        #[async_trait::async_trait]
        impl CandidateProvider for Stalled {
            async fn fetch_candidates(&self, _query: &Query) -> ProviderResult<Vec<Candidate>> {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(vec![candidate("tmdb:late", "Late Cats", 1.0)])
            }

            fn name(&self) -> &'static str {
                "stalled"
            }
        }

        let aggregator = Aggregator::new(
            Arc::new(Stalled),
            Arc::new(mock_returning("youtube", vec![candidate("youtube:1", "Cats", 1.0)])),
            Ranker::new(),
            Cache::in_memory(Duration::from_secs(180), 100),
            Duration::from_secs(5),
            50,
        );

        let results = aggregator.get_recommendations(&query(10)).await.unwrap();
        let ids: Vec<&str> = results.iter().map(|r| r.candidate.id.as_str()).collect();
        assert_eq!(ids, vec!["youtube:1"]);
    }
}
