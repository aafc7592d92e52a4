#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum_test::TestServer;

use quickflicks_api::{
    db::{Cache, MemoryInteractionStore, MemoryWatchlist},
    error::{ProviderError, ProviderResult},
    models::{Candidate, Platform, Query},
    routes::{create_router, AppState},
    services::{providers::CandidateProvider, Aggregator, Ranker},
};

/// Provider returning a fixed list and counting calls
pub struct StaticProvider {
    name: &'static str,
    candidates: Vec<Candidate>,
    calls: AtomicUsize,
}

impl StaticProvider {
    pub fn new(name: &'static str, candidates: Vec<Candidate>) -> Arc<Self> {
        Arc::new(Self {
            name,
            candidates,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl CandidateProvider for StaticProvider {
    async fn fetch_candidates(&self, _query: &Query) -> ProviderResult<Vec<Candidate>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.candidates.clone())
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

/// Provider that always fails
pub struct DownProvider {
    name: &'static str,
    calls: AtomicUsize,
}

impl DownProvider {
    pub fn new(name: &'static str) -> Arc<Self> {
        Arc::new(Self {
            name,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl CandidateProvider for DownProvider {
    async fn fetch_candidates(&self, _query: &Query) -> ProviderResult<Vec<Candidate>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(ProviderError::Unavailable("connection refused".to_string()))
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

/// Provider that answers after `delay`, counting calls
pub struct SlowProvider {
    delay: Duration,
    candidates: Vec<Candidate>,
    calls: AtomicUsize,
}

impl SlowProvider {
    pub fn new(delay: Duration, candidates: Vec<Candidate>) -> Arc<Self> {
        Arc::new(Self {
            delay,
            candidates,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl CandidateProvider for SlowProvider {
    async fn fetch_candidates(&self, _query: &Query) -> ProviderResult<Vec<Candidate>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        Ok(self.candidates.clone())
    }

    fn name(&self) -> &'static str {
        "slow"
    }
}

pub fn movie(id: &str, title: &str, year: i32, platform: Platform, popularity: f64) -> Candidate {
    let mut candidate = Candidate::new(id, title, platform, format!("https://example.com/{}", id));
    candidate.release_year = Some(year);
    candidate.popularity_score = popularity;
    candidate.rating_value = Some(7.5);
    candidate
}

pub fn aggregator(
    catalog: Arc<dyn CandidateProvider>,
    videos: Arc<dyn CandidateProvider>,
) -> Aggregator {
    Aggregator::new(
        catalog,
        videos,
        Ranker::new(),
        Cache::in_memory(Duration::from_secs(180), 100),
        Duration::from_secs(5),
        50,
    )
}

pub fn test_server(
    catalog: Arc<dyn CandidateProvider>,
    videos: Arc<dyn CandidateProvider>,
) -> TestServer {
    let state = AppState::new(
        aggregator(catalog, videos),
        Arc::new(MemoryInteractionStore::new()),
        Arc::new(MemoryWatchlist::new()),
    );
    TestServer::new(create_router(state)).unwrap()
}
