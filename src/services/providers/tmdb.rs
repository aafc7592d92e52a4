/// TMDB (The Movie Database) provider
///
/// Serves the `movie` and `tv_show` categories. Other categories yield an
/// empty list without touching the network.
///
/// API Flow:
/// 1. Search: /search/{movie|tv} → ranked hits with popularity, rating, genre IDs
/// 2. Details: /{movie|tv}/{id}?append_to_response=credits,watch/providers for
///    the top hits → cast, director, genre names, per-region streaming offers
/// 3. Related: /{movie|tv}/{id}/similar and /{movie|tv}/{id}/recommendations
///    for the top hit, once its details are known → titles like the one searched
///    for, themselves enriched through step 2
use std::collections::{BTreeSet, HashMap, HashSet};

use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use tokio::task::JoinSet;

use crate::{
    error::{ProviderError, ProviderResult},
    models::{
        tmdb::{genre_name, TmdbDetails, TmdbSearchResponse, TmdbSearchResult},
        Candidate, Category, Platform, Query,
    },
    services::providers::{decode_html_entities, CandidateProvider},
};

const POSTER_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";
const POSTER_PLACEHOLDER: &str =
    "https://via.placeholder.com/500x750/831010/ffffff?text=No+Poster";
const CAST_LIMIT: usize = 10;
/// Related titles below this TMDB popularity are dropped as obscure
const MIN_RELATED_POPULARITY: f64 = 10.0;
/// Upper bound on related titles added per search
const RELATED_LIMIT: usize = 20;

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    /// How many top search hits get a detail lookup
    detail_lookups: usize,
}

impl TmdbProvider {
    pub fn new(
        http_client: HttpClient,
        api_key: String,
        api_url: String,
        detail_lookups: usize,
    ) -> Self {
        Self {
            http_client,
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            detail_lookups,
        }
    }

    /// TMDB media type for a category, if TMDB serves it
    fn media_type(category: Category) -> Option<&'static str> {
        match category {
            Category::Movie => Some("movie"),
            Category::TvShow => Some("tv"),
            Category::ShortVideo | Category::ViralClip => None,
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, &str)],
    ) -> ProviderResult<T> {
        let response = self
            .http_client
            .get(url)
            .query(&[("api_key", self.api_key.as_str())])
            .query(params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::from_status(status, &body));
        }

        Ok(response.json().await?)
    }

    async fn search(&self, media_type: &str, query: &Query) -> ProviderResult<Vec<TmdbSearchResult>> {
        let url = format!("{}/search/{}", self.api_url, media_type);
        let mut params = vec![
            ("query", query.search_term()),
            ("language", "en-US"),
            ("page", "1"),
            ("include_adult", "false"),
        ];
        // Only movie search supports region filtering
        if media_type == "movie" {
            params.push(("region", query.region()));
        }

        let response: TmdbSearchResponse = self.get_json(&url, &params).await?;
        Ok(response.results)
    }

    async fn fetch_details(&self, media_type: &str, id: u64) -> ProviderResult<TmdbDetails> {
        let url = format!("{}/{}/{}", self.api_url, media_type, id);
        self.get_json(
            &url,
            &[
                ("language", "en-US"),
                ("append_to_response", "credits,watch/providers"),
            ],
        )
        .await
    }

    /// Looks up details for `ids` concurrently
    ///
    /// A failed lookup is logged and left out; the caller falls back to the
    /// search-level data for that title.
    async fn fetch_details_batch(
        &self,
        media_type: &'static str,
        ids: Vec<u64>,
    ) -> HashMap<u64, TmdbDetails> {
        let mut tasks = JoinSet::new();
        for id in ids {
            let provider = self.clone();
            tasks.spawn(async move { (id, provider.fetch_details(media_type, id).await) });
        }

        let mut details = HashMap::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((id, Ok(found))) => {
                    details.insert(id, found);
                }
                Ok((id, Err(e))) => {
                    tracing::warn!(tmdb_id = id, error = %e, provider = "tmdb", "Detail lookup failed");
                }
                Err(e) => {
                    tracing::error!(error = %e, provider = "tmdb", "Detail lookup task failed");
                }
            }
        }
        details
    }

    async fn fetch_related_list(
        &self,
        media_type: &str,
        id: u64,
        list: &str,
    ) -> ProviderResult<Vec<TmdbSearchResult>> {
        let url = format!("{}/{}/{}/{}", self.api_url, media_type, id, list);
        let response: TmdbSearchResponse = self
            .get_json(&url, &[("language", "en-US"), ("page", "1")])
            .await?;
        Ok(response.results)
    }

    /// Titles TMDB lists as similar to or recommended alongside `seed_id`
    ///
    /// Both lists are fetched concurrently; a failed list is logged and
    /// skipped. IDs in `known` and the seed itself are left out, as are titles
    /// under [`MIN_RELATED_POPULARITY`]. Most popular first, at most
    /// [`RELATED_LIMIT`].
    async fn fetch_related(
        &self,
        media_type: &str,
        seed_id: u64,
        known: &HashSet<u64>,
    ) -> Vec<TmdbSearchResult> {
        let (similar, recommended) = tokio::join!(
            self.fetch_related_list(media_type, seed_id, "similar"),
            self.fetch_related_list(media_type, seed_id, "recommendations"),
        );

        let mut seen = known.clone();
        seen.insert(seed_id);

        let mut related = Vec::new();
        for (list, result) in [("similar", similar), ("recommendations", recommended)] {
            match result {
                Ok(results) => related.extend(results.into_iter().filter(|result| {
                    result.popularity > MIN_RELATED_POPULARITY && seen.insert(result.id)
                })),
                Err(e) => {
                    tracing::warn!(tmdb_id = seed_id, list, error = %e, provider = "tmdb", "Related titles lookup failed");
                }
            }
        }

        related.sort_by(|a, b| b.popularity.total_cmp(&a.popularity));
        related.truncate(RELATED_LIMIT);
        related
    }

    /// Converts a search hit, enriched with its details when available
    fn to_candidate(
        result: TmdbSearchResult,
        details: Option<&TmdbDetails>,
        media_type: &str,
        region: &str,
    ) -> Candidate {
        let platforms = details
            .map(|details| details.platforms_in(region))
            .unwrap_or_default();

        let source_platform = Platform::STREAMING_PRIORITY
            .iter()
            .copied()
            .find(|platform| platforms.contains(platform))
            .unwrap_or(Platform::Tmdb);

        let available_platforms: BTreeSet<Platform> = if platforms.is_empty() {
            BTreeSet::from([Platform::Tmdb])
        } else {
            platforms.into_iter().collect()
        };

        let mut genre_tags: BTreeSet<String> = details
            .map(|details| details.genres.iter().map(|g| g.name.clone()).collect())
            .unwrap_or_default();
        if genre_tags.is_empty() {
            genre_tags = result
                .genre_ids
                .iter()
                .filter_map(|id| genre_name(*id))
                .map(str::to_string)
                .collect();
        }

        let release_year = result.release_year();
        let title = decode_html_entities(&result.title);
        let watch_url = watch_url(source_platform, &title, media_type, result.id);

        Candidate {
            id: format!("tmdb:{}:{}", media_type, result.id),
            thumbnail_url: result
                .poster_path
                .as_deref()
                .filter(|path| !path.is_empty())
                .map(|path| format!("{}{}", POSTER_BASE_URL, path))
                .unwrap_or_else(|| POSTER_PLACEHOLDER.to_string()),
            source_platform,
            available_platforms,
            release_year,
            // TMDB reports unrated titles as 0
            rating_value: (result.vote_average > 0.0).then_some(result.vote_average.min(10.0)),
            genre_tags,
            cast_names: details
                .map(|details| details.top_cast(CAST_LIMIT).into_iter().collect())
                .unwrap_or_default(),
            director_name: details.and_then(|details| details.director()),
            popularity_score: result.popularity.max(0.0),
            description: result
                .overview
                .filter(|overview| !overview.trim().is_empty()),
            watch_url,
            title,
        }
    }
}

/// Link opened when the card is clicked
///
/// Most services need a login before search, so their home page is used.
fn watch_url(platform: Platform, title: &str, media_type: &str, tmdb_id: u64) -> String {
    match platform {
        Platform::Netflix => "https://www.netflix.com/browse".to_string(),
        Platform::PrimeVideo => reqwest::Url::parse_with_params(
            "https://www.amazon.com/s",
            &[("k", title), ("i", "instant-video")],
        )
        .map(|url| url.to_string())
        .unwrap_or_else(|_| "https://www.amazon.com/gp/video/storefront".to_string()),
        Platform::DisneyPlus => "https://www.disneyplus.com/".to_string(),
        Platform::Hulu => "https://www.hulu.com/hub/home".to_string(),
        Platform::Max => "https://www.max.com/".to_string(),
        Platform::AppleTv => "https://tv.apple.com/".to_string(),
        Platform::Peacock => "https://www.peacocktv.com/".to_string(),
        Platform::Youtube | Platform::Tmdb => {
            format!("https://www.themoviedb.org/{}/{}", media_type, tmdb_id)
        }
    }
}

#[async_trait::async_trait]
impl CandidateProvider for TmdbProvider {
    async fn fetch_candidates(&self, query: &Query) -> ProviderResult<Vec<Candidate>> {
        let Some(media_type) = Self::media_type(query.category()) else {
            tracing::debug!(
                category = %query.category(),
                provider = "tmdb",
                "Category not served by provider"
            );
            return Ok(Vec::new());
        };

        let results = self.search(media_type, query).await?;
        if results.is_empty() {
            tracing::info!(query = %query.search_term(), provider = "tmdb", "No search results");
            return Ok(Vec::new());
        }

        let detail_ids: Vec<u64> = results
            .iter()
            .take(self.detail_lookups)
            .map(|result| result.id)
            .collect();
        let mut details = self.fetch_details_batch(media_type, detail_ids).await;

        // Expand from the top hit only when it resolved to a known title
        let related = match results.first().filter(|top| details.contains_key(&top.id)) {
            Some(top) => {
                let known: HashSet<u64> = results.iter().map(|result| result.id).collect();
                self.fetch_related(media_type, top.id, &known).await
            }
            None => Vec::new(),
        };
        let related_count = related.len();

        if !related.is_empty() {
            let related_ids: Vec<u64> = related
                .iter()
                .take(self.detail_lookups)
                .map(|result| result.id)
                .collect();
            details.extend(self.fetch_details_batch(media_type, related_ids).await);
        }

        let candidates: Vec<Candidate> = results
            .into_iter()
            .chain(related)
            .map(|result| {
                let found = details.get(&result.id);
                Self::to_candidate(result, found, media_type, query.region())
            })
            .collect();

        tracing::info!(
            query = %query.search_term(),
            results = candidates.len(),
            related = related_count,
            enriched = details.len(),
            provider = "tmdb",
            "Title search completed"
        );

        Ok(candidates)
    }

    fn serves(&self, category: Category) -> bool {
        Self::media_type(category).is_some()
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}
