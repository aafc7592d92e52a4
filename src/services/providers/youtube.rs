/// YouTube Data API provider
///
/// Serves every category: trailers for `movie` and `tv_show`, plain search for
/// `short_video` and most-viewed shorts for `viral_clip`.
///
/// API Flow:
/// 1. Search: /search?part=snippet&type=video → video IDs and snippets
/// 2. Statistics: /videos?part=statistics&id=... → view counts, used as popularity
use std::collections::{BTreeSet, HashMap, HashSet};

use reqwest::Client as HttpClient;

use crate::{
    error::{ProviderError, ProviderResult},
    models::{
        youtube::{YouTubeErrorResponse, YouTubeSearchItem, YouTubeSearchResponse, YouTubeVideosResponse},
        Candidate, Category, Platform, Query,
    },
    services::providers::{decode_html_entities, CandidateProvider},
};

/// Search parameters derived from the category
#[derive(Debug, Clone, PartialEq)]
struct SearchPlan {
    query: String,
    order: &'static str,
    video_duration: Option<&'static str>,
}

impl SearchPlan {
    fn for_query(query: &Query) -> Self {
        let term = query.search_term();
        match query.category() {
            Category::Movie => Self {
                query: format!("{} official trailer", term),
                order: "relevance",
                video_duration: None,
            },
            Category::TvShow => Self {
                query: format!("{} series trailer", term),
                order: "relevance",
                video_duration: None,
            },
            Category::ShortVideo => Self {
                query: term.to_string(),
                order: "relevance",
                video_duration: None,
            },
            Category::ViralClip => Self {
                query: format!("{} #shorts", term),
                order: "viewCount",
                video_duration: Some("short"),
            },
        }
    }
}

#[derive(Clone)]
pub struct YouTubeProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    max_results: u32,
}

impl YouTubeProvider {
    pub fn new(http_client: HttpClient, api_key: String, api_url: String, max_results: u32) -> Self {
        Self {
            http_client,
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            max_results,
        }
    }

    /// Maps a non-success response, recognizing quota errors sent as 403
    async fn error_for(response: reqwest::Response) -> ProviderError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if status == reqwest::StatusCode::FORBIDDEN {
            if let Ok(envelope) = serde_json::from_str::<YouTubeErrorResponse>(&body) {
                if envelope.error.is_quota_exhausted() {
                    return ProviderError::RateLimited;
                }
            }
        }
        ProviderError::from_status(status, &body)
    }

    async fn search(&self, query: &Query) -> ProviderResult<Vec<YouTubeSearchItem>> {
        let plan = SearchPlan::for_query(query);
        let max_results = self.max_results.to_string();

        let mut params = vec![
            ("part", "snippet"),
            ("type", "video"),
            ("q", plan.query.as_str()),
            ("order", plan.order),
            ("maxResults", max_results.as_str()),
            ("regionCode", query.region()),
            ("safeSearch", "moderate"),
            ("key", self.api_key.as_str()),
        ];
        if let Some(duration) = plan.video_duration {
            params.push(("videoDuration", duration));
        }

        let response = self
            .http_client
            .get(format!("{}/search", self.api_url))
            .query(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_for(response).await);
        }

        let body: YouTubeSearchResponse = response.json().await?;
        Ok(body.items)
    }

    async fn view_counts(&self, video_ids: &[String]) -> ProviderResult<HashMap<String, u64>> {
        let ids = video_ids.join(",");
        let response = self
            .http_client
            .get(format!("{}/videos", self.api_url))
            .query(&[
                ("part", "statistics"),
                ("id", ids.as_str()),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_for(response).await);
        }

        let body: YouTubeVideosResponse = response.json().await?;
        Ok(body
            .items
            .iter()
            .filter_map(|video| video.view_count().map(|count| (video.id.clone(), count)))
            .collect())
    }

    fn watch_url(category: Category, video_id: &str) -> String {
        match category {
            Category::ViralClip => format!("https://www.youtube.com/shorts/{}", video_id),
            _ => format!("https://www.youtube.com/watch?v={}", video_id),
        }
    }

    fn to_candidate(
        video_id: String,
        item: YouTubeSearchItem,
        category: Category,
        views: Option<u64>,
    ) -> Candidate {
        let snippet = item.snippet;
        let description = decode_html_entities(snippet.description.trim());

        Candidate {
            id: format!("youtube:{}", video_id),
            title: decode_html_entities(&snippet.title),
            thumbnail_url: snippet
                .thumbnail_url()
                .map(str::to_string)
                .unwrap_or_else(|| format!("https://i.ytimg.com/vi/{}/hqdefault.jpg", video_id)),
            source_platform: Platform::Youtube,
            available_platforms: BTreeSet::from([Platform::Youtube]),
            release_year: snippet.published_year(),
            rating_value: None,
            genre_tags: BTreeSet::new(),
            cast_names: BTreeSet::new(),
            director_name: None,
            popularity_score: views.unwrap_or(0) as f64,
            description: (!description.is_empty()).then_some(description),
            watch_url: Self::watch_url(category, &video_id),
        }
    }
}

#[async_trait::async_trait]
impl CandidateProvider for YouTubeProvider {
    async fn fetch_candidates(&self, query: &Query) -> ProviderResult<Vec<Candidate>> {
        let items = self.search(query).await?;

        // Drop items without a video ID and repeated IDs
        let mut seen = HashSet::new();
        let videos: Vec<(String, YouTubeSearchItem)> = items
            .into_iter()
            .filter_map(|item| item.id.video_id.clone().map(|id| (id, item)))
            .filter(|(id, _)| seen.insert(id.clone()))
            .collect();

        if videos.is_empty() {
            tracing::info!(query = %query.search_term(), provider = "youtube", "No search results");
            return Ok(Vec::new());
        }

        let ids: Vec<String> = videos.iter().map(|(id, _)| id.clone()).collect();
        let views = match self.view_counts(&ids).await {
            Ok(views) => views,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    provider = "youtube",
                    "Statistics lookup failed, view counts default to 0"
                );
                HashMap::new()
            }
        };

        let category = query.category();
        let candidates: Vec<Candidate> = videos
            .into_iter()
            .map(|(id, item)| {
                let count = views.get(&id).copied();
                Self::to_candidate(id, item, category, count)
            })
            .collect();

        tracing::info!(
            query = %query.search_term(),
            category = %category,
            results = candidates.len(),
            provider = "youtube",
            "Video search completed"
        );

        Ok(candidates)
    }

    fn name(&self) -> &'static str {
        "youtube"
    }
}
