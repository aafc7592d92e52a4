/// Content provider abstraction
///
/// This module provides a pluggable architecture for the third-party metadata
/// sources the aggregator fans out to (a movie/TV database and a video
/// platform). Each provider translates a normalized [`Query`] into its own
/// request shape and its response into [`Candidate`]s.
use crate::{
    error::ProviderResult,
    models::{Candidate, Category, Query},
};

pub mod tmdb;
pub mod youtube;

pub use tmdb::TmdbProvider;
pub use youtube::YouTubeProvider;

/// Trait for content providers
///
/// Implementations issue one or a small fixed number of outbound calls per
/// invocation and never retry; retry policy belongs to the caller. An empty
/// result set is a successful `Ok(vec![])`.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CandidateProvider: Send + Sync {
    /// Fetch candidates matching the query
    async fn fetch_candidates(&self, query: &Query) -> ProviderResult<Vec<Candidate>>;

    /// Whether this provider has content for `category`
    ///
    /// The aggregator skips providers that do not serve the requested
    /// category, so their empty answer never counts as a success.
    fn serves(&self, _category: Category) -> bool {
        true
    }

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Decodes the handful of HTML entities the providers leave in titles
pub(crate) fn decode_html_entities(text: &str) -> String {
    text.replace("&#39;", "'")
        .replace("&quot;", "\"")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// Builds a shared HTTP client for provider calls
pub fn http_client(timeout: std::time::Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .connect_timeout(timeout)
        .timeout(timeout)
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to build tuned HTTP client, using defaults");
            reqwest::Client::new()
        })
}
