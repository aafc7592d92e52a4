// ============================================================================
// YouTube Data API Types
// ============================================================================

use chrono::{DateTime, Datelike, Utc};
use serde::Deserialize;

/// Response from GET /search
#[derive(Debug, Clone, Deserialize)]
pub struct YouTubeSearchResponse {
    #[serde(default)]
    pub items: Vec<YouTubeSearchItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct YouTubeSearchItem {
    pub id: YouTubeItemId,
    pub snippet: YouTubeSnippet,
}

/// Search results can point at channels or playlists, which carry no `videoId`
#[derive(Debug, Clone, Deserialize)]
pub struct YouTubeItemId {
    #[serde(default, rename = "videoId")]
    pub video_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YouTubeSnippet {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub channel_title: String,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub thumbnails: YouTubeThumbnails,
}

impl YouTubeSnippet {
    pub fn published_year(&self) -> Option<i32> {
        self.published_at
            .as_deref()
            .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
            .map(|ts| ts.with_timezone(&Utc).year())
    }

    /// Best available thumbnail, largest first
    pub fn thumbnail_url(&self) -> Option<&str> {
        self.thumbnails
            .high
            .as_ref()
            .or(self.thumbnails.medium.as_ref())
            .or(self.thumbnails.default.as_ref())
            .map(|thumb| thumb.url.as_str())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct YouTubeThumbnails {
    #[serde(default)]
    pub high: Option<YouTubeThumbnail>,
    #[serde(default)]
    pub medium: Option<YouTubeThumbnail>,
    #[serde(default)]
    pub default: Option<YouTubeThumbnail>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct YouTubeThumbnail {
    pub url: String,
}

/// Response from GET /videos?part=statistics
#[derive(Debug, Clone, Deserialize)]
pub struct YouTubeVideosResponse {
    #[serde(default)]
    pub items: Vec<YouTubeVideo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct YouTubeVideo {
    pub id: String,
    #[serde(default)]
    pub statistics: Option<YouTubeStatistics>,
}

/// The API encodes counters as decimal strings
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YouTubeStatistics {
    #[serde(default)]
    pub view_count: Option<String>,
}

impl YouTubeVideo {
    pub fn view_count(&self) -> Option<u64> {
        self.statistics
            .as_ref()
            .and_then(|stats| stats.view_count.as_deref())
            .and_then(|count| count.parse().ok())
    }
}

/// Error envelope returned with non-2xx statuses
#[derive(Debug, Clone, Deserialize)]
pub struct YouTubeErrorResponse {
    pub error: YouTubeErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct YouTubeErrorBody {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub errors: Vec<YouTubeErrorDetail>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct YouTubeErrorDetail {
    #[serde(default)]
    pub reason: String,
}

impl YouTubeErrorBody {
    /// Whether the failure is the daily quota or a per-user rate limit
    pub fn is_quota_exhausted(&self) -> bool {
        self.errors.iter().any(|detail| {
            matches!(
                detail.reason.as_str(),
                "quotaExceeded" | "rateLimitExceeded" | "dailyLimitExceeded" | "userRateLimitExceeded"
            )
        })
    }
}
