use std::sync::Arc;

use crate::db::{InteractionStore, WatchlistStore};
use crate::services::{Aggregator, InteractionRecorder};

/// Shared application state
///
/// Cheap to clone; every component behind it does its own locking.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

pub struct AppStateInner {
    pub aggregator: Aggregator,
    pub recorder: InteractionRecorder,
    pub interactions: Arc<dyn InteractionStore>,
    pub watchlist: Arc<dyn WatchlistStore>,
}

impl AppState {
    pub fn new(
        aggregator: Aggregator,
        interactions: Arc<dyn InteractionStore>,
        watchlist: Arc<dyn WatchlistStore>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                aggregator,
                recorder: InteractionRecorder::new(interactions.clone()),
                interactions,
                watchlist,
            }),
        }
    }
}

impl std::ops::Deref for AppState {
    type Target = AppStateInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
